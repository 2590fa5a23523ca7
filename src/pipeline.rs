//! Run a sequence of steps over file records.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    files::Files,
    front_matter::{read_dir, SourceError},
};

/// A pipeline step.
///
/// A step receives the whole collection of records, with exclusive access for
/// the duration of the call, and the pipeline running it.
pub trait Plugin {
    /// Process the records.
    fn run(&self, files: &mut Files, pipeline: &Pipeline) -> anyhow::Result<()>;
}

impl<F> Plugin for F
where
    F: Fn(&mut Files, &Pipeline) -> anyhow::Result<()>,
{
    fn run(&self, files: &mut Files, pipeline: &Pipeline) -> anyhow::Result<()> {
        (self)(files, pipeline)
    }
}

/// A sequence of steps applied to the files of a source directory.
pub struct Pipeline {
    /// Directory of input files.
    source_dir: PathBuf,

    /// Steps, in order of execution.
    plugins: Vec<Box<dyn Plugin>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source_dir", &self.source_dir)
            .field("plugins", &self.plugins.len())
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline reading files from `source_dir`.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            plugins: Vec::new(),
        }
    }

    /// Append a step.
    pub fn use_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Return the directory of input files.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Read the source directory into file records.
    pub fn read(&self) -> Result<Files, SourceError> {
        read_dir(&self.source_dir)
    }

    /// Run every step on `files`, in order.
    ///
    /// The first failing step stops the pipeline and its error is returned
    /// unchanged.
    pub fn process(&self, files: &mut Files) -> anyhow::Result<()> {
        for (index, plugin) in self.plugins.iter().enumerate() {
            tracing::debug!("Running step {} of {}", index + 1, self.plugins.len());
            plugin.run(files, self)?;
        }
        Ok(())
    }

    /// Read the source directory and run every step.
    pub fn build(&self) -> anyhow::Result<Files> {
        let start_time = std::time::Instant::now();

        let mut files = self
            .read()
            .with_context(|| format!("failed to read {:?}", self.source_dir))?;

        self.process(&mut files)?;

        tracing::info!(
            "Processed {} files in {:.2} seconds",
            files.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::files::FileRecord;

    #[test]
    fn steps_run_in_order() {
        let pipeline = Pipeline::new("src")
            .use_plugin(|files: &mut Files, _: &Pipeline| -> anyhow::Result<()> {
                files.insert("a", FileRecord::with_contents("1"));
                Ok(())
            })
            .use_plugin(|files: &mut Files, _: &Pipeline| -> anyhow::Result<()> {
                let record = files.get_mut("a").ok_or_else(|| anyhow!("missing a"))?;
                record.contents.push('2');
                Ok(())
            });

        let mut files = Files::new();
        pipeline.process(&mut files).unwrap();

        assert_eq!(files.get("a").unwrap().contents, "12");
    }

    #[test]
    fn first_error_stops() {
        let pipeline = Pipeline::new("src")
            .use_plugin(|_: &mut Files, _: &Pipeline| -> anyhow::Result<()> {
                Err(anyhow!("first"))
            })
            .use_plugin(|_: &mut Files, _: &Pipeline| -> anyhow::Result<()> {
                Err(anyhow!("second"))
            });

        let error = pipeline.process(&mut Files::new()).unwrap_err();

        assert_eq!(error.to_string(), "first");
    }

    #[test]
    fn context_is_the_pipeline() {
        let pipeline = Pipeline::new("site").use_plugin(
            |files: &mut Files, pipeline: &Pipeline| -> anyhow::Result<()> {
                let dir = pipeline.source_dir().to_string_lossy().to_string();
                files.insert(dir, FileRecord::new());
                Ok(())
            },
        );

        let mut files = Files::new();
        pipeline.process(&mut files).unwrap();

        assert!(files.get("site").is_some());
    }
}
