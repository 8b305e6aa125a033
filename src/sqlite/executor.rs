use rusqlite::{Connection, params_from_iter};

use super::params::SqliteParams;
use super::query::build_result_set;
use crate::config::ConnectionDescriptor;
use crate::error::SqlFluentError;
use crate::executor::DatabaseExecutor;
use crate::results::ResultSet;
use crate::types::{DriverKind, Params};

/// `SQLite` connection backed by rusqlite.
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    /// Open the database file named by the descriptor's `path` (`:memory:` works too).
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConfigError` if no path is set, or the rusqlite error if
    /// the file cannot be opened.
    pub fn open(desc: &ConnectionDescriptor) -> Result<Self, SqlFluentError> {
        let path = desc
            .path
            .as_deref()
            .ok_or_else(|| SqlFluentError::ConfigError("path is required".to_string()))?;
        let conn = Connection::open(path)?;
        tracing::info!(dsn = %desc.dsn(), "opened sqlite connection");
        Ok(Self { conn })
    }

    /// Wrap an already-open rusqlite connection.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Borrow the underlying rusqlite connection.
    #[must_use]
    pub fn raw(&self) -> &Connection {
        &self.conn
    }
}

impl std::fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteExecutor")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl DatabaseExecutor for SqliteExecutor {
    fn driver_kind(&self) -> DriverKind {
        DriverKind::Sqlite
    }

    fn execute_batch(&mut self, sql: &str) -> Result<(), SqlFluentError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn run(&mut self, sql: &str, params: &Params) -> Result<ResultSet, SqlFluentError> {
        let converted = SqliteParams::convert(params);
        let mut stmt = self.conn.prepare_cached(sql)?;

        if stmt.column_count() == 0 {
            let affected = match &converted {
                SqliteParams::Positional(values) => stmt.execute(params_from_iter(values.iter()))?,
                SqliteParams::Named(values) => {
                    stmt.execute(SqliteParams::named_refs(values).as_slice())?
                }
            };
            return Ok(ResultSet::affected(affected));
        }

        match &converted {
            SqliteParams::Positional(values) => {
                build_result_set(&mut stmt, params_from_iter(values.iter()))
            }
            SqliteParams::Named(values) => {
                build_result_set(&mut stmt, SqliteParams::named_refs(values).as_slice())
            }
        }
    }

    fn last_insert_id(&mut self) -> Option<String> {
        match self.conn.last_insert_rowid() {
            0 => None,
            id => Some(id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RowValues;

    fn executor() -> SqliteExecutor {
        let mut exec = SqliteExecutor::open(&ConnectionDescriptor::sqlite(":memory:")).unwrap();
        exec.execute_batch("CREATE TABLE pets (id INTEGER PRIMARY KEY, name TEXT, age INT);")
            .unwrap();
        exec
    }

    #[test]
    fn named_insert_then_positional_select() {
        let mut exec = executor();
        let inserted = exec
            .run(
                "INSERT INTO pets (name, age) VALUES (:name, :age)",
                &Params::from(vec![("name", RowValues::from("Rex")), ("age", RowValues::Int(3))]),
            )
            .unwrap();
        assert_eq!(inserted.rows_affected, 1);
        assert!(inserted.results.is_empty());
        assert_eq!(exec.last_insert_id().as_deref(), Some("1"));

        let rs = exec
            .run(
                "SELECT name, age FROM pets WHERE age >= ?",
                &Params::from(vec![RowValues::Int(2)]),
            )
            .unwrap();
        assert_eq!(rs.results.len(), 1);
        assert_eq!(rs.results[0].get("name"), Some(&RowValues::from("Rex")));
    }

    #[test]
    fn no_insert_means_no_id() {
        let mut exec = executor();
        assert_eq!(exec.last_insert_id(), None);
    }

    #[test]
    fn driver_errors_surface() {
        let mut exec = executor();
        let err = exec.run("SELEC nonsense", &Params::default()).unwrap_err();
        assert!(matches!(err, SqlFluentError::SqliteError(_)));
    }
}
