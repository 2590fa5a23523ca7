//! Dynamic values stored in page data.

use serde::{Deserialize, Serialize};

/// Type used for [`Value`] maps.
pub type Map<K = String, V = Value> = std::collections::HashMap<K, V>;

/// A dynamic value.
///
/// Page fields come from front matters written in JSON, TOML, or YAML, so
/// their type is only known at run time.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    I64(i64),
    /// Unsigned integer.
    U64(u64),
    /// Float.
    F64(f64),
    /// String.
    Str(String),
    /// Null.
    Unit,
    /// Array.
    Seq(Vec<Self>),
    /// Object.
    Map(Map<String, Self>),
}

impl Value {
    /// Return the type name as a string slice.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::F64(_) => "f64",
            Self::Str(_) => "str",
            Self::Unit => "unit",
            Self::Seq(_) => "seq",
            Self::Map(_) => "map",
        }
    }

    /// If the value is a `bool`, returns the associated [`bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// If the value is a `str`, returns the associated `&str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Check if the value is a `map`.
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    /// If the value is a `map`, returns the associated [`Map`].
    pub fn as_map(&self) -> Option<&Map<String, Self>> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Unit
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Map<String, Value>> for Value {
    fn from(value: Map<String, Value>) -> Self {
        Self::Map(value)
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        match self {
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::I64(v) => serializer.serialize_i64(*v),
            Self::U64(v) => serializer.serialize_u64(*v),
            Self::F64(v) => serializer.serialize_f64(*v),
            Self::Str(v) => serializer.serialize_str(v),
            Self::Unit => serializer.serialize_unit(),
            Self::Seq(v) => v.serialize(serializer),
            Self::Map(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

/// A visitor that implements [`serde::de::Visitor`] to deserialize [`Value`].
struct ValueVisitor;

impl<'de> serde::de::Visitor<'de> for ValueVisitor {
    type Value = self::Value;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Value::I64(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Value::U64(v))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Value::F64(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Value::Str(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Value::Str(v))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Value::Unit)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Value::Unit)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut values = Vec::new();
        while let Some(v) = seq.next_element()? {
            values.push(v);
        }
        Ok(Value::Seq(values))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut pairs = Map::new();
        while let Some((k, v)) = map.next_entry()? {
            pairs.insert(k, v);
        }
        Ok(Value::Map(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::{Map, Value};

    #[test]
    fn deserialize_json() {
        let value: Value =
            serde_json::from_str(r#"{"files": {"foo": "./foo.txt"}, "draft": false, "n": -1}"#)
                .unwrap();

        let expected = Value::Map(Map::from([
            (
                "files".to_owned(),
                Value::from([("foo", "./foo.txt")]),
            ),
            ("draft".to_owned(), Value::Bool(false)),
            ("n".to_owned(), Value::I64(-1)),
        ]));

        assert_eq!(value, expected);
    }

    #[test]
    fn deserialize_yaml_null() {
        let value: Value = serde_yaml::from_str("title: ~\ntags: [a, b]\n").unwrap();

        let map = value.as_map().unwrap();

        assert_eq!(map.get("title"), Some(&Value::Unit));
        assert_eq!(
            map.get("tags"),
            Some(&Value::Seq(vec![Value::from("a"), Value::from("b")]))
        );
    }

    #[test]
    fn serialize_map() {
        let value = Value::from([("foo", "bar")]);

        let result = serde_json::to_string(&value).unwrap();

        assert_eq!(result, r#"{"foo":"bar"}"#);
    }

    #[test]
    fn type_name() {
        assert_eq!(Value::from("foo").type_name(), "str");
        assert_eq!(Value::Map(Map::new()).type_name(), "map");
        assert_eq!(Value::Unit.type_name(), "unit");
    }
}
