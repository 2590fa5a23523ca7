//! Loader errors.

use thiserror::Error;

/// List of errors reported by the file loader.
///
/// A run reports at most one of these.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The `key` option is not a string.
    #[error("invalid key, the key option should be a string")]
    InvalidKey,
    /// The `out` option is not a string.
    #[error("invalid out, the out option should be a string")]
    InvalidOut,
    /// A boolean option has another type.
    #[error("invalid {name}, the {name} option should be a boolean")]
    InvalidFlag {
        /// Option name.
        name: &'static str,
    },
    /// Options could not be parsed from a configuration source.
    #[error("failed to parse options as {format}")]
    ParseOptions {
        /// Source format (e.g. `toml`).
        format: String,
        /// Source error.
        #[source]
        source: anyhow::Error,
    },
    /// No record owns the source field.
    #[error("no files to process.")]
    NoFiles,
    /// The source field of a record is not a map.
    #[error("invalid {key} in {record}, expected a map of file paths")]
    InvalidReferenceMap {
        /// Record name.
        record: String,
        /// Source field name.
        key: String,
    },
    /// A reference does not hold a path string.
    #[error("invalid reference {name} in {record}, the path should be a string")]
    InvalidReference {
        /// Record name.
        record: String,
        /// Reference name.
        name: String,
    },
    /// A referenced file could not be read.
    ///
    /// The underlying I/O error is not kept.
    #[error("could not load file: {path}")]
    LoadFile {
        /// Path as written in the reference map.
        path: String,
    },
    /// The async runtime could not be created.
    #[error("failed to start the async runtime")]
    Runtime(#[source] std::io::Error),
}
