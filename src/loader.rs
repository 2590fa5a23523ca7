//! Replace file paths in page data with file contents.
//!
//! Records owning the configured field hold a map from reference names to
//! file paths:
//!
//! ```yaml
//! files:
//!   foo: ./files/foo.txt
//!   bar: ./files/bar.md
//! ```
//!
//! After loading, each path is replaced by the contents of the file it points
//! to, either in place or in another field.

use futures::stream::{FuturesUnordered, StreamExt};

use crate::{
    config::Options,
    error::LoadError,
    files::Files,
    pipeline::{Pipeline, Plugin},
    util::value::Value,
};

/// Create a file loader with given options.
pub fn file_loader(options: Options) -> FileLoader {
    FileLoader::new(options)
}

/// A pipeline step that loads referenced files.
#[derive(Clone, Debug, Default)]
pub struct FileLoader {
    options: Options,
}

/// A reference found in a record, taken before any file is read.
#[derive(Debug)]
struct Reference {
    /// Name of the record.
    record: String,

    /// Name of the reference in the map.
    name: String,

    /// Path to read, or [`None`] if the reference is not a path and missing
    /// files are allowed.
    path: Option<String>,
}

impl FileLoader {
    /// Create a file loader.
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Return the loader options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Load referenced files into `files`.
    ///
    /// All files are read concurrently. Each result is written as soon as its
    /// read completes. The first read that fails ends the run: reads still in
    /// flight are dropped, and values written so far are kept.
    pub async fn load(&self, files: &mut Files) -> Result<(), LoadError> {
        let key = self.options.key.as_str();
        let out = self.options.destination();

        let names = files.names_with_field(key);

        if names.is_empty() {
            if self.options.suppress_no_files_error {
                tracing::debug!("No files with {:?}, skipping", key);
                return Ok(());
            }
            return Err(LoadError::NoFiles);
        }

        let references = self.collect_references(files, &names)?;
        let num_references = references.len();

        let mut reads: FuturesUnordered<_> = references
            .into_iter()
            .map(|reference| async move {
                let result = match reference.path.as_deref() {
                    Some(path) => {
                        tracing::debug!("Loading {:?}", path);
                        // Invalid UTF-8 sequences are replaced, not rejected
                        tokio::fs::read(path)
                            .await
                            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                            .map_err(Some)
                    },
                    None => Err(None),
                };
                (reference, result)
            })
            .collect();

        while let Some((reference, result)) = reads.next().await {
            let contents = match result {
                Ok(contents) => contents,
                Err(error) if self.options.allow_missing_files => {
                    tracing::debug!(
                        "In {:?}, could not load {:?} ({}), using an empty string",
                        reference.record,
                        reference.path.as_deref().unwrap_or_default(),
                        error.map_or_else(|| "not a path".to_owned(), |e| e.to_string())
                    );
                    String::new()
                },
                Err(_) => {
                    return Err(LoadError::LoadFile {
                        path: reference.path.unwrap_or_default(),
                    });
                },
            };

            // Records were selected from `files`, which is held exclusively
            let Some(record) = files.get_mut(&reference.record) else {
                continue;
            };

            record
                .map_entry(out)
                .insert(reference.name, Value::Str(contents));
        }

        tracing::info!(
            "Loaded {} files referenced by {} records",
            num_references,
            names.len()
        );

        Ok(())
    }

    /// Load referenced files, blocking the current thread until done.
    ///
    /// Reads run on a single-threaded runtime. When called from within an
    /// async runtime, that runtime is driven by a scoped thread, since a
    /// runtime cannot block inside another one. Async callers should prefer
    /// [`FileLoader::load`].
    pub fn load_blocking(&self, files: &mut Files) -> Result<(), LoadError> {
        if tokio::runtime::Handle::try_current().is_err() {
            return self.block_on_load(files);
        }

        std::thread::scope(|scope| {
            scope
                .spawn(|| self.block_on_load(files))
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
        })
    }

    /// Run [`FileLoader::load`] on a new current-thread runtime.
    fn block_on_load(&self, files: &mut Files) -> Result<(), LoadError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(LoadError::Runtime)?;

        rt.block_on(self.load(files))
    }

    /// Take every `(record, reference, path)` triple of the selected records.
    fn collect_references(
        &self,
        files: &Files,
        names: &[String],
    ) -> Result<Vec<Reference>, LoadError> {
        let key = self.options.key.as_str();

        let mut references = Vec::new();

        for name in names {
            let Some(value) = files.get(name).and_then(|record| record.get(key)) else {
                continue;
            };

            let map = match value {
                Value::Map(map) => map,
                // Declared without any entry
                Value::Unit => continue,
                _ => {
                    return Err(LoadError::InvalidReferenceMap {
                        record: name.to_owned(),
                        key: key.to_owned(),
                    })
                },
            };

            for (reference, path) in map {
                let path = match path.as_str() {
                    Some(path) => Some(path.to_owned()),
                    None if self.options.allow_missing_files => None,
                    None => {
                        return Err(LoadError::InvalidReference {
                            record: name.to_owned(),
                            name: reference.to_owned(),
                        })
                    },
                };

                references.push(Reference {
                    record: name.to_owned(),
                    name: reference.to_owned(),
                    path,
                });
            }
        }

        Ok(references)
    }
}

impl Plugin for FileLoader {
    fn run(&self, files: &mut Files, _: &Pipeline) -> anyhow::Result<()> {
        Ok(self.load_blocking(files)?)
    }
}
