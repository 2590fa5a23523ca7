//! Load files referenced in page data.
//!
//! This crate provides a pipeline step that looks for a map of file paths in
//! the data of each page (usually declared in the front matter), reads every
//! referenced file, and replaces each path with the file contents.
//!
//! ```no_run
//! use vitrine_file_loader::{file_loader, Options, Pipeline};
//!
//! let files = Pipeline::new("src")
//!     .use_plugin(file_loader(Options::default().out("contents")))
//!     .build()
//!     .unwrap();
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod files;
pub mod front_matter;
pub mod loader;
pub mod pipeline;
pub mod util;

pub use config::Options;
pub use error::LoadError;
pub use files::{FileRecord, Files};
pub use loader::{file_loader, FileLoader};
pub use pipeline::{Pipeline, Plugin};
pub use util::value::{Map, Value};
