//! Configure the file loader.

use std::path::Path;

use anyhow::anyhow;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{error::LoadError, util::value::Value};

/// Default name of the field holding file paths.
pub const DEFAULT_KEY: &str = "files";

/// Options of the file loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Name of the field holding the map of file paths.
    pub key: String,

    /// Name of the field receiving the file contents.
    ///
    /// An empty string means the same field as `key`.
    pub out: String,

    /// Succeed when no record owns the `key` field.
    pub suppress_no_files_error: bool,

    /// Use an empty string as contents when a file cannot be read.
    pub allow_missing_files: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_owned(),
            out: String::new(),
            suppress_no_files_error: false,
            allow_missing_files: false,
        }
    }
}

impl Options {
    /// Set the source field name.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the destination field name.
    pub fn out(mut self, out: impl Into<String>) -> Self {
        self.out = out.into();
        self
    }

    /// Set whether an empty selection is an error.
    pub fn suppress_no_files_error(mut self, suppress: bool) -> Self {
        self.suppress_no_files_error = suppress;
        self
    }

    /// Set whether unreadable files are tolerated.
    pub fn allow_missing_files(mut self, allow: bool) -> Self {
        self.allow_missing_files = allow;
        self
    }

    /// Return the name of the field receiving the file contents.
    pub fn destination(&self) -> &str {
        if self.out.is_empty() {
            &self.key
        } else {
            &self.out
        }
    }

    /// Build options from an untyped options object.
    ///
    /// Missing options take their default value. Option types are checked in
    /// the order `key`, `out`, then flags.
    pub fn from_value(value: &Value) -> Result<Self, LoadError> {
        let mut options = Self::default();

        let Some(map) = value.as_map() else {
            // Nothing set: `null` or an empty document
            return match value {
                Value::Unit => Ok(options),
                _ => Err(LoadError::ParseOptions {
                    format: "object".to_owned(),
                    source: anyhow!("expected a map, found {}", value.type_name()),
                }),
            };
        };

        if let Some(key) = map.get("key") {
            options.key = key.as_str().ok_or(LoadError::InvalidKey)?.to_owned();
        }

        if let Some(out) = map.get("out") {
            options.out = out.as_str().ok_or(LoadError::InvalidOut)?.to_owned();
        }

        if let Some(flag) = map.get("suppressNoFilesError") {
            options.suppress_no_files_error = flag.as_bool().ok_or(LoadError::InvalidFlag {
                name: "suppressNoFilesError",
            })?;
        }

        if let Some(flag) = map.get("allowMissingFiles") {
            options.allow_missing_files = flag.as_bool().ok_or(LoadError::InvalidFlag {
                name: "allowMissingFiles",
            })?;
        }

        Ok(options)
    }

    /// Parse options from a string in given format (`json`, `toml`, or
    /// `yaml`).
    pub fn from_source(source: &str, format: &str) -> Result<Self, LoadError> {
        let value: Value = parse_data(source, format).map_err(|source| LoadError::ParseOptions {
            format: format.to_owned(),
            source,
        })?;
        Self::from_value(&value)
    }

    /// Read options from a configuration file.
    ///
    /// The format is determined by the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();

        let format = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| match extension {
                "yml" => "yaml",
                extension => extension,
            })
            .unwrap_or_default()
            .to_owned();

        tracing::debug!("Reading options from {:?}", path);

        let source = std::fs::read_to_string(path).map_err(|error| LoadError::ParseOptions {
            format: format.clone(),
            source: anyhow::Error::new(error).context(format!("reading {path:?}")),
        })?;

        Self::from_source(&source, &format)
    }
}

/// Deserialize data from a string and a format.
pub(crate) fn parse_data<T>(data: &str, format: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    Ok(match format {
        "json" => serde_json::from_str(data)?,
        "toml" => toml::from_str(data)?,
        "yaml" => serde_yaml::from_str(data)?,
        _ => return Err(anyhow!("unknown format {:?}", format)),
    })
}
