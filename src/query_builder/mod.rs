//! Fluent statement assembly and execution.
//!
//! A [`QueryBuilder`] accumulates one statement at a time. Terminal calls (`first`,
//! `all`, `insert`, `update`, `delete`, `execute`) run it, clear the pending text and
//! values, and keep the outcome until the next execution.
//!
//! ```rust
//! use sql_fluent::prelude::*;
//!
//! # fn main() -> Result<(), SqlFluentError> {
//! let conn = Connection::open(&ConnectionDescriptor::sqlite(":memory:"))?;
//! conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, status TEXT, age INTEGER);")?;
//!
//! let mut users = conn.builder();
//! users.table("users");
//! users.insert([("status", RowValues::from("active")), ("age", 30.into())])?;
//!
//! users
//!     .select(["id", "age"])
//!     .where_([("status =", RowValues::from("active")), ("age >=", 18.into())])?;
//! assert_eq!(
//!     users.current_sql(),
//!     "SELECT id, age FROM users WHERE status = ? AND age >= ? "
//! );
//! let adults = users.all()?;
//! assert_eq!(adults.len(), 1);
//! assert_eq!(users.current_sql(), "");
//! # Ok(())
//! # }
//! ```

use std::marker::PhantomData;

use crate::connection::Connection;
use crate::error::{ErrorInfo, SqlFluentError};
use crate::results::{FetchMode, Record, StatementHandle};
use crate::types::Params;

pub mod condition;
mod dml;
mod fetch;
mod select;
mod statement;

pub use condition::{Condition, Operator};
pub use select::{Direction, JoinKind};

use statement::Statement;

/// Whether execution insists on a target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableCheck {
    Required,
    Skip,
}

/// Builds and runs statements against one [`Connection`].
///
/// `S` is the shape fetched rows are returned in: [`Record`] by default, or any
/// [`FromRecord`](crate::results::FromRecord) type chosen with [`QueryBuilder::as_object`].
pub struct QueryBuilder<S = Record> {
    conn: Connection,
    table: String,
    statement: Statement,
    fetch_mode: FetchMode,
    last: Option<StatementHandle>,
    shape: PhantomData<fn() -> S>,
}

impl QueryBuilder<Record> {
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            table: String::new(),
            statement: Statement::Idle,
            fetch_mode: FetchMode::default(),
            last: None,
            shape: PhantomData,
        }
    }
}

impl<S> QueryBuilder<S> {
    fn reshape<T>(self) -> QueryBuilder<T> {
        QueryBuilder {
            conn: self.conn,
            table: self.table,
            statement: self.statement,
            fetch_mode: self.fetch_mode,
            last: self.last,
            shape: PhantomData,
        }
    }

    /// Set the table used by the statements that follow.
    pub fn table(&mut self, name: impl Into<String>) -> &mut Self {
        self.table = name.into();
        self
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Return rows as plain [`Record`]s.
    #[must_use]
    pub fn as_array(self) -> QueryBuilder<Record> {
        self.reshape()
    }

    /// Return rows mapped into `T`.
    #[must_use]
    pub fn as_object<T>(self) -> QueryBuilder<T> {
        self.reshape()
    }

    /// Choose how returned rows are keyed.
    pub fn fetch_mode(&mut self, mode: FetchMode) -> &mut Self {
        self.fetch_mode = mode;
        self
    }

    /// The pending SQL text; empty once a statement has run.
    #[must_use]
    pub fn current_sql(&self) -> &str {
        self.statement.sql()
    }

    /// Values bound to the pending statement.
    #[must_use]
    pub fn current_params(&self) -> Params {
        self.statement.params()
    }

    /// Rows changed or returned by the last statement.
    #[must_use]
    pub fn affected_rows(&self) -> usize {
        self.last.as_ref().map_or(0, StatementHandle::row_count)
    }

    /// Identifier generated by the last insert on this connection, if any.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConnectionClosed` after `close`.
    pub fn last_insert_id(&self) -> Result<Option<String>, SqlFluentError> {
        self.conn.with_executor(|executor| executor.last_insert_id())
    }

    /// Driver diagnostics for the last statement.
    #[must_use]
    pub fn errors(&self) -> ErrorInfo {
        self.last
            .as_ref()
            .map_or_else(ErrorInfo::success, StatementHandle::error_info)
    }

    #[must_use]
    pub fn last_statement(&self) -> Option<&StatementHandle> {
        self.last.as_ref()
    }

    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the shared connection and drop the retained statement.
    pub fn close(&mut self) {
        self.statement = Statement::Idle;
        self.last = None;
        self.conn.close();
    }

    /// Run the pending statement and retain its outcome.
    ///
    /// The pending text and values are cleared whatever happens. Driver failures are
    /// captured in the returned handle; only structural misuse is an `Err`.
    pub(crate) fn execute_query(
        &mut self,
        check: TableCheck,
    ) -> Result<&mut StatementHandle, SqlFluentError> {
        let statement = std::mem::take(&mut self.statement);
        if check == TableCheck::Required && self.table.trim().is_empty() {
            return Err(SqlFluentError::MissingTable);
        }
        let (sql, params) = statement.into_parts();

        tracing::debug!(sql = %sql, params = params.len(), "executing statement");
        let outcome = self
            .conn
            .with_executor(|executor| executor.run(&sql, &params))?;
        if let Err(err) = &outcome {
            tracing::warn!(sql = %sql, error = %err, "statement failed");
        }

        Ok(self.last.insert(StatementHandle::new(sql, outcome)))
    }
}

impl<S> std::fmt::Debug for QueryBuilder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("table", &self.table)
            .field("sql", &self.statement.sql())
            .field("fetch_mode", &self.fetch_mode)
            .finish_non_exhaustive()
    }
}
