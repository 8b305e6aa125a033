use std::collections::VecDeque;

use super::result_set::ResultSet;
use super::row::{FetchMode, Record};
use crate::error::{ErrorInfo, SqlFluentError};
use crate::types::RowValues;

/// The retained outcome of the most recent execution.
///
/// Rows are buffered when the statement runs; fetching drains them in order.
#[derive(Debug, Clone)]
pub struct StatementHandle {
    sql: String,
    rows: VecDeque<Record>,
    row_count: usize,
    error: Option<ErrorInfo>,
}

impl StatementHandle {
    pub(crate) fn new(sql: String, outcome: Result<ResultSet, SqlFluentError>) -> Self {
        match outcome {
            Ok(result_set) => Self {
                sql,
                row_count: result_set.rows_affected,
                rows: result_set.results.into(),
                error: None,
            },
            Err(err) => Self {
                sql,
                rows: VecDeque::new(),
                row_count: 0,
                error: Some(ErrorInfo::from(&err)),
            },
        }
    }

    /// The SQL text that was sent to the driver.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// Rows changed by DML, or rows produced by a query.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        self.error.clone().unwrap_or_else(ErrorInfo::success)
    }

    /// Take the next row, or `None` once the rows are exhausted.
    pub fn fetch_one(&mut self, mode: FetchMode) -> Option<Record> {
        self.rows.pop_front().map(|row| row.keyed(mode))
    }

    /// Take every remaining row.
    pub fn fetch_all(&mut self, mode: FetchMode) -> Vec<Record> {
        self.rows.drain(..).map(|row| row.keyed(mode)).collect()
    }

    /// Take the first column of every remaining row.
    pub fn fetch_column(&mut self) -> Vec<RowValues> {
        self.rows
            .drain(..)
            .filter_map(|mut row| {
                if row.rows.is_empty() {
                    None
                } else {
                    Some(row.rows.swap_remove(0))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn handle() -> StatementHandle {
        let mut rs = ResultSet::with_capacity(2);
        rs.set_column_names(Arc::new(vec!["name".into(), "age".into()]));
        rs.add_row_values(vec![RowValues::from("a"), RowValues::Int(1)]);
        rs.add_row_values(vec![RowValues::from("b"), RowValues::Int(2)]);
        StatementHandle::new("SELECT name, age FROM t".into(), Ok(rs))
    }

    #[test]
    fn fetch_drains_in_order() {
        let mut h = handle();
        assert_eq!(h.row_count(), 2);
        let first = h.fetch_one(FetchMode::Associative).unwrap();
        assert_eq!(first.get("name"), Some(&RowValues::from("a")));
        assert_eq!(h.fetch_column(), vec![RowValues::from("b")]);
        assert!(h.fetch_one(FetchMode::Associative).is_none());
        assert!(h.fetch_all(FetchMode::Associative).is_empty());
    }

    #[test]
    fn failure_is_captured() {
        let h = StatementHandle::new(
            "SELEC".into(),
            Err(SqlFluentError::ExecutionError("syntax".into())),
        );
        assert!(!h.succeeded());
        assert_eq!(h.row_count(), 0);
        assert!(!h.error_info().is_success());
        assert!(handle().error_info().is_success());
    }
}
