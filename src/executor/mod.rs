//! The driver seam: everything the builder needs from a live database connection.

use crate::config::ConnectionDescriptor;
use crate::error::SqlFluentError;
use crate::results::ResultSet;
use crate::types::{DriverKind, Params};

#[cfg(feature = "postgres")]
use crate::postgres;
#[cfg(feature = "sqlite")]
use crate::sqlite;

/// A live, synchronous database connection.
///
/// Implementations prepare, execute and fully buffer one statement per `run` call.
pub trait DatabaseExecutor: Send {
    fn driver_kind(&self) -> DriverKind;

    /// Executes a batch of SQL statements. No parameters are supported.
    ///
    /// # Errors
    /// Returns the driver error if any statement in the batch fails.
    fn execute_batch(&mut self, sql: &str) -> Result<(), SqlFluentError>;

    /// Prepares and executes a single statement.
    ///
    /// Statements that return columns yield their rows; others yield an empty
    /// result set whose `rows_affected` is the number of rows changed.
    ///
    /// # Errors
    /// Returns the driver error if preparing, binding or executing fails.
    fn run(&mut self, sql: &str, params: &Params) -> Result<ResultSet, SqlFluentError>;

    /// Identifier generated by the most recent insert, if the driver can report one.
    fn last_insert_id(&mut self) -> Option<String>;
}

/// Open an executor for the descriptor's driver kind.
///
/// # Errors
/// Returns `SqlFluentError::ConfigError` for an incomplete descriptor or a driver that
/// is not compiled in, and the driver error if connecting fails.
pub fn open_executor(
    desc: &ConnectionDescriptor,
) -> Result<Box<dyn DatabaseExecutor>, SqlFluentError> {
    desc.validate()?;
    match desc.driver {
        #[cfg(feature = "sqlite")]
        DriverKind::Sqlite => Ok(Box::new(sqlite::SqliteExecutor::open(desc)?)),
        #[cfg(feature = "postgres")]
        DriverKind::Postgres => Ok(Box::new(postgres::PostgresExecutor::connect(desc)?)),
        #[allow(unreachable_patterns)]
        other => Err(SqlFluentError::ConfigError(format!(
            "driver {other:?} is not enabled in the current build"
        ))),
    }
}
