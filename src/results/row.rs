use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::error::SqlFluentError;
use crate::types::RowValues;

/// How fetched rows are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Keyed by column name.
    #[default]
    Associative,
    /// Keyed by zero-based column position (`"0"`, `"1"`, ...).
    Numeric,
    /// Keyed by column name, followed by the same values keyed by position.
    Both,
}

/// A row from a statement result.
///
/// Column names are shared across all rows of one result set.
#[derive(Debug, Clone)]
pub struct Record {
    /// The keys for this row, in fetch order
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub rows: Vec<RowValues>,
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl Record {
    /// Create a new record
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column names
    /// * `rows` - The values for this row
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let cache = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            rows,
            column_index_cache: cache,
        }
    }

    pub(crate) fn with_cache(
        column_names: Arc<Vec<String>>,
        rows: Vec<RowValues>,
        column_index_cache: Arc<HashMap<String, usize>>,
    ) -> Self {
        Self {
            column_names,
            rows,
            column_index_cache,
        }
    }

    /// Re-key this row according to `mode`.
    #[must_use]
    pub fn keyed(self, mode: FetchMode) -> Self {
        match mode {
            FetchMode::Associative => self,
            FetchMode::Numeric => {
                let keys = (0..self.rows.len()).map(|i| i.to_string()).collect();
                Record::new(Arc::new(keys), self.rows)
            }
            FetchMode::Both => {
                let mut keys: Vec<String> = self.column_names.as_ref().clone();
                keys.extend((0..self.rows.len()).map(|i| i.to_string()));
                let mut values = self.rows.clone();
                values.extend(self.rows);
                Record::new(Arc::new(keys), values)
            }
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }
        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value from the row by column name
    ///
    /// Returns `None` if the column wasn't found.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.rows.iter())
    }

    /// JSON object view of the row; later duplicate keys win.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let map: Map<String, JsonValue> = self
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_json()))
            .collect();
        JsonValue::Object(map)
    }

    /// Deserialize this row into any serde type, matching fields by column name.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConversionError` when the row does not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, SqlFluentError> {
        serde_json::from_value(self.to_json()).map_err(|e| {
            SqlFluentError::ConversionError(format!("cannot map record into target type: {e}"))
        })
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.column_names == other.column_names && self.rows == other.rows
    }
}

pub(crate) fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    let mut cache = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        cache.entry(name.clone()).or_insert(i);
    }
    cache
}

/// Construct a result value from one fetched record.
///
/// `Record` itself implements this, so untyped fetching is the identity.
/// Types that derive `serde::Deserialize` can delegate to [`Record::deserialize`]:
///
/// ```rust
/// use serde::Deserialize;
/// use sql_fluent::prelude::*;
///
/// #[derive(Deserialize)]
/// struct Pet {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRecord for Pet {
///     fn from_record(record: Record) -> Result<Self, SqlFluentError> {
///         record.deserialize()
///     }
/// }
/// ```
pub trait FromRecord: Sized {
    /// # Errors
    /// Returns `SqlFluentError::ConversionError` when the record cannot be mapped.
    fn from_record(record: Record) -> Result<Self, SqlFluentError>;
}

impl FromRecord for Record {
    fn from_record(record: Record) -> Result<Self, SqlFluentError> {
        Ok(record)
    }
}

impl FromRecord for JsonValue {
    fn from_record(record: Record) -> Result<Self, SqlFluentError> {
        Ok(record.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn sample() -> Record {
        Record::new(
            Arc::new(vec!["id".to_string(), "name".to_string()]),
            vec![RowValues::Int(1), RowValues::Text("Rex".into())],
        )
    }

    #[test]
    fn numeric_keys_replace_names() {
        let rec = sample().keyed(FetchMode::Numeric);
        assert_eq!(rec.get("0"), Some(&RowValues::Int(1)));
        assert_eq!(rec.get("name"), None);
    }

    #[test]
    fn both_keys_duplicate_values() {
        let rec = sample().keyed(FetchMode::Both);
        assert_eq!(rec.len(), 4);
        assert_eq!(rec.get("name"), rec.get("1"));
    }

    #[test]
    fn deserializes_into_struct() {
        #[derive(Deserialize)]
        struct Pet {
            id: i64,
            name: String,
        }
        let pet: Pet = sample().deserialize().unwrap();
        assert_eq!(pet.id, 1);
        assert_eq!(pet.name, "Rex");

        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Wrong {
            missing: bool,
        }
        assert!(matches!(
            sample().deserialize::<Wrong>(),
            Err(SqlFluentError::ConversionError(_))
        ));
    }
}
