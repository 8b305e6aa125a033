use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::SqlFluentError;
use crate::types::RowValues;

lazy_static! {
    static ref CONDITION_KEY: Regex =
        Regex::new(
            r"^\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)?)\s*(<=|>=|<>|!=|=|<|>|(?i:like))?\s*$"
        )
            .expect("condition key pattern is valid");
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid");
}

/// Comparison operator recognised at the end of a condition key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Like,
}

impl Operator {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "=" => Operator::Eq,
            "<>" | "!=" => Operator::NotEq,
            "<" => Operator::Lt,
            ">" => Operator::Gt,
            "<=" => Operator::LtEq,
            ">=" => Operator::GtEq,
            t if t.eq_ignore_ascii_case("like") => Operator::Like,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::LtEq => "<=",
            Operator::GtEq => ">=",
            Operator::Like => "LIKE",
        }
    }
}

/// Split a condition key such as `"age >="` into its column and operator.
///
/// The column may be qualified (`pets.id`) and is kept as written. A bare column
/// means `=`; anything that is not a column optionally followed by one operator is
/// rejected.
///
/// # Errors
/// Returns `SqlFluentError::InvalidCondition` for malformed keys.
pub fn parse_condition_key(key: &str) -> Result<(String, Operator), SqlFluentError> {
    let caps = CONDITION_KEY
        .captures(key)
        .ok_or_else(|| SqlFluentError::InvalidCondition(format!("unrecognised key `{key}`")))?;
    let column = caps[1].to_string();
    let op = match caps.get(2) {
        Some(token) => Operator::parse(token.as_str()).ok_or_else(|| {
            SqlFluentError::InvalidCondition(format!("unrecognised operator in `{key}`"))
        })?,
        None => Operator::Eq,
    };
    Ok((column, op))
}

/// Whether `name` may be interpolated as a column or named placeholder.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// The argument of `where_`, `or_where` and friends.
///
/// Raw text is appended verbatim with no binding; the caller is responsible for its
/// safety. Pairs map a condition key (`"status"`, `"age >="`, `"name like"`) to a bound
/// value.
///
/// ```rust
/// use sql_fluent::prelude::*;
///
/// let raw = Condition::from("deleted_at IS NULL");
/// let pairs = Condition::from([("status =", RowValues::from("active")), ("age >=", 18.into())]);
/// assert!(!raw.is_empty() && !pairs.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Raw(String),
    Pairs(Vec<(String, RowValues)>),
}

impl Condition {
    /// A condition that adds nothing.
    #[must_use]
    pub fn none() -> Self {
        Condition::Pairs(Vec::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Condition::Raw(sql) => sql.trim().is_empty(),
            Condition::Pairs(pairs) => pairs.is_empty(),
        }
    }

    /// Check every key without building anything.
    ///
    /// # Errors
    /// Returns `SqlFluentError::InvalidCondition` for the first malformed key.
    pub fn validate(&self) -> Result<(), SqlFluentError> {
        if let Condition::Pairs(pairs) = self {
            for (key, _) in pairs {
                parse_condition_key(key)?;
            }
        }
        Ok(())
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::none()
    }
}

impl From<&str> for Condition {
    fn from(sql: &str) -> Self {
        Condition::Raw(sql.to_string())
    }
}

impl From<String> for Condition {
    fn from(sql: String) -> Self {
        Condition::Raw(sql)
    }
}

impl<K: Into<String>, V: Into<RowValues>> From<Vec<(K, V)>> for Condition {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Condition::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<RowValues>, const N: usize> From<[(K, V); N]> for Condition {
    fn from(pairs: [(K, V); N]) -> Self {
        Condition::from(Vec::from(pairs))
    }
}

impl<K: Into<String>, V: Into<RowValues>> From<BTreeMap<K, V>> for Condition {
    fn from(pairs: BTreeMap<K, V>) -> Self {
        Condition::from(pairs.into_iter().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_column_defaults_to_equality() {
        assert_eq!(
            parse_condition_key("status").unwrap(),
            ("status".to_string(), Operator::Eq)
        );
    }

    #[test]
    fn operators_are_detected_case_insensitively() {
        for (key, op) in [
            ("age >=", Operator::GtEq),
            ("age >= ", Operator::GtEq),
            ("age>=", Operator::GtEq),
            ("age <", Operator::Lt),
            ("age <=", Operator::LtEq),
            ("age <>", Operator::NotEq),
            ("age !=", Operator::NotEq),
            ("name LIKE", Operator::Like),
            ("name like", Operator::Like),
            ("name Like ", Operator::Like),
        ] {
            let (column, parsed) = parse_condition_key(key).unwrap();
            assert_eq!(parsed, op, "{key}");
            assert!(column == "age" || column == "name");
        }
    }

    #[test]
    fn like_needs_to_be_its_own_token() {
        assert_eq!(
            parse_condition_key("unlike").unwrap(),
            ("unlike".to_string(), Operator::Eq)
        );
    }

    #[test]
    fn qualified_columns_are_kept() {
        assert_eq!(
            parse_condition_key("pets.id >").unwrap(),
            ("pets.id".to_string(), Operator::Gt)
        );
        assert_eq!(
            parse_condition_key("users.id").unwrap(),
            ("users.id".to_string(), Operator::Eq)
        );
        assert!(parse_condition_key("a.b.c").is_err());
        assert!(parse_condition_key(".id").is_err());
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for key in ["age foo", "1=1 OR x", "", "a = = ", "name; DROP TABLE x"] {
            assert!(
                matches!(
                    parse_condition_key(key),
                    Err(SqlFluentError::InvalidCondition(_))
                ),
                "{key}"
            );
        }
    }

    #[test]
    fn empty_conditions() {
        assert!(Condition::from("  ").is_empty());
        assert!(Condition::none().is_empty());
        assert!(!Condition::from(vec![("id", 1)]).is_empty());
    }

    #[test]
    fn validate_reports_the_bad_key() {
        assert!(Condition::from("anything goes").validate().is_ok());
        assert!(Condition::from(vec![("id", 1), ("age >=", 2)]).validate().is_ok());
        let err = Condition::from(vec![("id", 1), ("age bogus", 2)])
            .validate()
            .unwrap_err();
        assert!(matches!(err, SqlFluentError::InvalidCondition(msg) if msg.contains("age bogus")));
    }
}
