//! Read a source directory into file records.
//!
//! Each file may start with a front matter. Its fields become the fields of
//! the record, and the rest of the file becomes the record contents. This
//! module uses [`ignore`] to walk directories.

use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;

use crate::{
    config::parse_data,
    files::{FileRecord, Files},
    util::value::Value,
};

/// Delimiter used for TOML front matters.
const TOML_DELIMITER: &str = "+++";

/// Delimiter used for YAML front matters.
const YAML_DELIMITER: &str = "---";

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Ignore error.
    #[error(transparent)]
    Walk(#[from] ignore::Error),
    /// I/O error.
    #[error("failed to read {path:?}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Source error.
        source: std::io::Error,
    },
    /// Front matter error.
    #[error("failed to parse the front matter of {path:?}")]
    FrontMatter {
        /// File path.
        path: PathBuf,
        /// Source error.
        source: anyhow::Error,
    },
    /// The front matter is not a map.
    #[error("the front matter of {path:?} should be a map, found {type_name}")]
    NotAMap {
        /// File path.
        path: PathBuf,
        /// Type of the parsed front matter.
        type_name: &'static str,
    },
}

/// Read all files of a directory recursively.
///
/// Hidden files are skipped. Records are named after their path relative to
/// `dir`, using `/` as separator. Files that are not valid UTF-8 become
/// records with no fields and empty contents.
pub fn read_dir(dir: impl AsRef<Path>) -> Result<Files, SourceError> {
    let dir = dir.as_ref();

    let mut files = Files::new();

    let walker = WalkBuilder::new(dir)
        .hidden(true)
        .git_ignore(false)
        .ignore(false)
        .parents(false)
        .git_global(false)
        .git_exclude(false)
        .build();

    for entry in walker {
        let entry = entry?;

        if !entry
            .file_type()
            .is_some_and(|file_type| file_type.is_file())
        {
            continue;
        }

        let path = entry.path();

        // `strip_prefix()` cannot fail since the walker yields descendants of `dir`
        let relative_path = path.strip_prefix(dir).unwrap_or(path);

        tracing::trace!("Reading {:?}", path);

        let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
            path: path.to_owned(),
            source,
        })?;

        // Binary files (images, fonts...) have no front matter
        let Ok(source) = String::from_utf8(bytes) else {
            tracing::trace!("Skipping front matter of binary file {:?}", path);
            files.insert(record_name(relative_path), FileRecord::new());
            continue;
        };

        let record = read_record(&source).map_err(|error| match error {
            RecordError::Parse(source) => SourceError::FrontMatter {
                path: path.to_owned(),
                source,
            },
            RecordError::NotAMap(type_name) => SourceError::NotAMap {
                path: path.to_owned(),
                type_name,
            },
        })?;

        files.insert(record_name(relative_path), record);
    }

    tracing::debug!("Read {} files from {:?}", files.len(), dir);

    Ok(files)
}

/// Create a record name from a relative path.
fn record_name(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Error while turning a file into a record.
enum RecordError {
    Parse(anyhow::Error),
    NotAMap(&'static str),
}

/// Create a record from the source of a file.
fn read_record(source: &str) -> Result<FileRecord, RecordError> {
    let Some((format, data, contents)) = extract_front_matter(source) else {
        return Ok(FileRecord::with_contents(source));
    };

    let fields = match parse_data::<Value>(data, format).map_err(RecordError::Parse)? {
        Value::Map(fields) => fields,
        // An empty YAML front matter
        Value::Unit => Default::default(),
        value => return Err(RecordError::NotAMap(value.type_name())),
    };

    Ok(FileRecord {
        contents: contents.to_owned(),
        fields,
    })
}

/// Extract front matter and content from a string.
///
/// When a front matter is detected, this function returns a tuple `(format,
/// data, content)`, where:
/// - `format` is the expected data format.
/// - `data` is the front matter string.
/// - `content` is the content without front matter.
///
/// Otherwise, it returns [`None`].
fn extract_front_matter(source: &str) -> Option<(&str, &str, &str)> {
    let delimiter = [TOML_DELIMITER, YAML_DELIMITER]
        .into_iter()
        .find(|delimiter| source.starts_with(delimiter))?;

    // The rest of the first line may name the format
    let (format, source) = source[delimiter.len()..].split_once('\n')?;

    let format = match format.trim() {
        "" if delimiter == TOML_DELIMITER => "toml",
        "" => "yaml",
        format => format,
    };

    let data_end = source.find(&format!("\n{delimiter}"))?;

    let data = &source[..data_end + 1];
    let content = &source[data_end + 1 + delimiter.len()..];

    // The closing delimiter must end the line
    let content = content
        .is_empty()
        .then_some(content)
        .or_else(|| content.strip_prefix('\n'))
        .or_else(|| content.strip_prefix("\r\n"))?;

    Some((format, data, content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_no_front_matter() {
        const INPUT: &str = concat!(
            "foo\n", //
            "---\n", //
            "bar\n", //
            "---\n"
        );

        assert!(extract_front_matter(INPUT).is_none());
    }

    #[test]
    fn extract_no_closing_delimiter() {
        const INPUT: &str = concat!(
            "---\n", //
            "files:\n"
        );

        assert!(extract_front_matter(INPUT).is_none());
    }

    #[test]
    fn extract_crlf() {
        const INPUT: &str = concat!(
            "---\r\n",             //
            "title: \"post\"\r\n", //
            "---\r\n",             //
            "foo\r\n"
        );

        let (format, data, content) = extract_front_matter(INPUT).unwrap();

        assert_eq!(format, "yaml");
        assert_eq!(data, "title: \"post\"\r\n");
        assert_eq!(content, "foo\r\n");
    }

    #[test]
    fn read_yaml_record() {
        const INPUT: &str = concat!(
            "---\n",                        //
            "files:\n",                     //
            "  foo: ./files/foo.txt\n",     //
            "  bar: ./files/bar.md\n",      //
            "---\n",                        //
            "<p>body</p>\n"
        );

        let record = read_record(INPUT).ok().unwrap();

        assert_eq!(record.contents, "<p>body</p>\n");
        let files = record.reference_map("files").unwrap();
        assert_eq!(files.get("foo"), Some(&Value::from("./files/foo.txt")));
        assert_eq!(files.get("bar"), Some(&Value::from("./files/bar.md")));
    }

    #[test]
    fn read_toml_record() {
        const INPUT: &str = concat!(
            "+++\n",                     //
            "[files]\n",                 //
            "foo = \"./foo.txt\"\n",     //
            "+++\n",                     //
            "body"
        );

        let record = read_record(INPUT).ok().unwrap();

        assert_eq!(record.contents, "body");
        assert!(record.has_field("files"));
    }

    #[test]
    fn read_json_record() {
        const INPUT: &str = concat!(
            "---json\n",                     //
            "{\"files\": {\"foo\": \"a\"}}\n", //
            "---\n"
        );

        let record = read_record(INPUT).ok().unwrap();

        assert_eq!(record.contents, "");
        assert!(record.reference_map("files").is_some());
    }

    #[test]
    fn read_plain_record() {
        let record = read_record("no front matter").ok().unwrap();

        assert_eq!(record.contents, "no front matter");
        assert!(record.fields.is_empty());
    }

    #[test]
    fn front_matter_not_a_map() {
        const INPUT: &str = concat!(
            "---\n",      //
            "- a\n",      //
            "---\n"
        );

        assert!(matches!(
            read_record(INPUT),
            Err(RecordError::NotAMap("seq"))
        ));
    }

    #[test]
    fn record_name_uses_slashes() {
        let path = Path::new("blog").join("post").join("index.html");

        assert_eq!(record_name(&path), "blog/post/index.html");
    }

    #[test]
    fn read_dir_keeps_binary_files() {
        use assert_fs::prelude::*;

        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("index.html")
            .write_str("---\ntitle: Home\n---\n<h1>Home</h1>\n")
            .unwrap();
        dir.child("logo.png")
            .write_binary(b"\x89PNG\r\n\x1a\n\xff\xfe")
            .unwrap();

        let files = read_dir(dir.path()).unwrap();

        assert_eq!(files.len(), 2);
        let index = files.get("index.html").unwrap();
        assert_eq!(index.get("title"), Some(&Value::from("Home")));
        assert_eq!(index.contents, "<h1>Home</h1>\n");
        assert_eq!(files.get("logo.png"), Some(&FileRecord::new()));
    }
}
