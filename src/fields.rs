use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::SqlFluentError;
use crate::results::Record;
use crate::types::RowValues;

/// An ordered, flat column → value list, the input of `insert` and `update`.
///
/// ```rust
/// use sql_fluent::prelude::*;
///
/// let fields = Fields::new().with("name", "Rex").with("age", 3);
/// assert_eq!(fields.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(String, RowValues)>);

impl Fields {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a field, replacing an earlier one of the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RowValues>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<RowValues>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Flatten any serializable struct or map into fields.
    ///
    /// Top-level keys become columns; nested arrays and objects are stored as JSON.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConversionError` if `value` does not serialize to an object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, SqlFluentError> {
        match serde_json::to_value(value)? {
            JsonValue::Object(map) => Ok(Self(
                map.into_iter()
                    .map(|(k, v)| (k, RowValues::from_json(v)))
                    .collect(),
            )),
            other => Err(SqlFluentError::ConversionError(format!(
                "expected a struct or map, got `{other}`"
            ))),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<(String, RowValues)> {
        self.0
    }
}

impl<K: Into<String>, V: Into<RowValues>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.set(k, v);
        }
        fields
    }
}

impl<K: Into<String>, V: Into<RowValues>> From<Vec<(K, V)>> for Fields {
    fn from(values: Vec<(K, V)>) -> Self {
        values.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<RowValues>, const N: usize> From<[(K, V); N]> for Fields {
    fn from(values: [(K, V); N]) -> Self {
        values.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<RowValues>> From<BTreeMap<K, V>> for Fields {
    fn from(values: BTreeMap<K, V>) -> Self {
        values.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<RowValues>> From<HashMap<K, V>> for Fields {
    fn from(values: HashMap<K, V>) -> Self {
        values.into_iter().collect()
    }
}

impl From<&Record> for Fields {
    fn from(record: &Record) -> Self {
        record.iter().map(|(k, v)| (k, v.clone())).collect()
    }
}

impl From<Record> for Fields {
    fn from(record: Record) -> Self {
        Fields::from(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Pet {
        name: &'static str,
        age: u8,
        tags: Vec<&'static str>,
        owner: Option<i64>,
    }

    #[test]
    fn flattens_serializable_structs() {
        let fields = Fields::from_serialize(&Pet {
            name: "Rex",
            age: 3,
            tags: vec!["good"],
            owner: None,
        })
        .unwrap();
        let map: HashMap<&str, &RowValues> = fields.iter().collect();
        assert_eq!(map["name"], &RowValues::from("Rex"));
        assert_eq!(map["age"], &RowValues::Int(3));
        assert_eq!(map["tags"], &RowValues::JSON(serde_json::json!(["good"])));
        assert_eq!(map["owner"], &RowValues::Null);
    }

    #[test]
    fn rejects_scalars() {
        assert!(matches!(
            Fields::from_serialize(&5),
            Err(SqlFluentError::ConversionError(_))
        ));
    }

    #[test]
    fn later_duplicates_replace_earlier() {
        let fields = Fields::from(vec![("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(
            fields.into_vec(),
            vec![("a".to_string(), RowValues::Int(3)), ("b".to_string(), RowValues::Int(2))]
        );
    }
}
