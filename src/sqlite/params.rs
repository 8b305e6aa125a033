use rusqlite::ToSql;
use rusqlite::types::Value;

use crate::types::{Params, RowValues};

/// Convert a single `RowValues` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Statement parameters converted to `SQLite` values, keeping their binding style.
pub enum SqliteParams {
    Positional(Vec<Value>),
    /// Names carry the leading `:` rusqlite expects.
    Named(Vec<(String, Value)>),
}

impl SqliteParams {
    #[must_use]
    pub fn convert(params: &Params) -> Self {
        match params {
            Params::Positional(values) => {
                SqliteParams::Positional(values.iter().map(row_value_to_sqlite_value).collect())
            }
            Params::Named(values) => SqliteParams::Named(
                values
                    .iter()
                    .map(|(name, value)| {
                        let key = if name.starts_with(':') {
                            name.clone()
                        } else {
                            format!(":{name}")
                        };
                        (key, row_value_to_sqlite_value(value))
                    })
                    .collect(),
            ),
        }
    }

    /// Borrowed `(name, value)` pairs for named binding.
    #[must_use]
    pub fn named_refs(values: &[(String, Value)]) -> Vec<(&str, &dyn ToSql)> {
        values
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn names_gain_colon_prefix() {
        let params = Params::from(vec![("name", RowValues::from("Rex")), (":age", RowValues::Int(3))]);
        let SqliteParams::Named(values) = SqliteParams::convert(&params) else {
            panic!("expected named params");
        };
        assert_eq!(values[0].0, ":name");
        assert_eq!(values[1].0, ":age");
    }

    #[test]
    fn scalar_conversions() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(
            row_value_to_sqlite_value(&RowValues::Timestamp(ts)),
            Value::Text("2024-01-02 03:04:05".into())
        );
        assert_eq!(
            row_value_to_sqlite_value(&RowValues::Bool(true)),
            Value::Integer(1)
        );
        assert_eq!(
            row_value_to_sqlite_value(&RowValues::JSON(serde_json::json!({"a": 1}))),
            Value::Text(r#"{"a":1}"#.into())
        );
    }
}
