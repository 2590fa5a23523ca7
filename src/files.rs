//! In-memory file records processed by a pipeline.

use std::collections::BTreeMap;

use crate::util::value::{Map, Value};

/// A file record.
///
/// A record represents one file of the processed tree: its body and the named
/// fields attached to it (usually parsed from the front matter).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileRecord {
    /// Body of the file, without front matter.
    pub contents: String,

    /// Named fields.
    pub fields: Map<String, Value>,
}

impl FileRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record with given body.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            fields: Map::new(),
        }
    }

    /// Set a field, consuming and returning the record.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Check whether the record owns a field named `name`.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Return the field named `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a field and return its previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Return the field named `name` if it holds a map.
    pub fn reference_map(&self, name: &str) -> Option<&Map<String, Value>> {
        self.get(name).and_then(Value::as_map)
    }

    /// Return the map stored in field `name`, creating an empty one if the
    /// field is missing or does not hold a map.
    pub(crate) fn map_entry(&mut self, name: &str) -> &mut Map<String, Value> {
        let value = self
            .fields
            .entry(name.to_owned())
            .or_insert_with(|| Value::Map(Map::new()));

        if !value.is_map() {
            *value = Value::Map(Map::new());
        }

        match value {
            Value::Map(map) => map,
            _ => unreachable!(),
        }
    }
}

/// A collection of file records, keyed by their unique name.
///
/// The name is the path of the file relative to the processed tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Files(BTreeMap<String, FileRecord>);

impl Files {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record and return the one it replaces.
    pub fn insert(&mut self, name: impl Into<String>, record: FileRecord) -> Option<FileRecord> {
        self.0.insert(name.into(), record)
    }

    /// Return the record named `name`.
    pub fn get(&self, name: &str) -> Option<&FileRecord> {
        self.0.get(name)
    }

    /// Return the record named `name` as a mutable reference.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FileRecord> {
        self.0.get_mut(name)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, record)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileRecord)> {
        self.0.iter()
    }

    /// Return the names of records that own a field named `field`.
    pub fn names_with_field(&self, field: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, record)| record.has_field(field))
            .map(|(name, _)| name.to_owned())
            .collect()
    }
}

impl FromIterator<(String, FileRecord)> for Files {
    fn from_iter<I: IntoIterator<Item = (String, FileRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, FileRecord); N]> for Files {
    fn from(records: [(&str, FileRecord); N]) -> Self {
        records
            .into_iter()
            .map(|(name, record)| (name.to_owned(), record))
            .collect()
    }
}

impl IntoIterator for Files {
    type IntoIter = std::collections::btree_map::IntoIter<String, FileRecord>;
    type Item = (String, FileRecord);

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{FileRecord, Files};
    use crate::util::value::Value;

    #[test]
    fn names_with_field() {
        let files = Files::from([
            ("a.html", FileRecord::new().field("files", [("foo", "foo.txt")])),
            ("b.html", FileRecord::new().field("title", "b")),
            ("c.html", FileRecord::new().field("files", Value::Unit)),
        ]);

        assert_eq!(files.names_with_field("files"), vec!["a.html", "c.html"]);
        assert!(files.names_with_field("nope").is_empty());
    }

    #[test]
    fn map_entry_keeps_existing_map() {
        let mut record = FileRecord::new().field("out", [("keep", "me")]);

        record.map_entry("out").insert("new".into(), "value".into());

        let out = record.reference_map("out").unwrap();
        assert_eq!(out.get("keep"), Some(&Value::from("me")));
        assert_eq!(out.get("new"), Some(&Value::from("value")));
    }

    #[test]
    fn map_entry_replaces_scalar() {
        let mut record = FileRecord::new().field("out", "scalar");

        assert!(record.map_entry("out").is_empty());
        assert!(record.get("out").unwrap().is_map());
    }
}
