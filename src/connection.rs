use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lazy_static::lazy_static;

use crate::config::ConnectionDescriptor;
use crate::error::SqlFluentError;
use crate::executor::{DatabaseExecutor, open_executor};
use crate::query_builder::QueryBuilder;
use crate::types::DriverKind;

type Slot = Option<Box<dyn DatabaseExecutor>>;

/// Shared handle to one live database connection.
///
/// Clones refer to the same connection. Once [`Connection::close`] runs, every clone
/// reports [`SqlFluentError::ConnectionClosed`].
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Mutex<Slot>>,
}

impl Connection {
    /// Open a connection described by `desc`.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConfigError` for an incomplete descriptor, or the driver
    /// error if connecting fails.
    pub fn open(desc: &ConnectionDescriptor) -> Result<Self, SqlFluentError> {
        Ok(Self::from_boxed(open_executor(desc)?))
    }

    /// Wrap an executor that was opened elsewhere.
    pub fn from_executor(executor: impl DatabaseExecutor + 'static) -> Self {
        Self::from_boxed(Box::new(executor))
    }

    fn from_boxed(executor: Box<dyn DatabaseExecutor>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(executor))),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the live executor.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConnectionClosed` if the connection has been closed.
    pub fn with_executor<R>(
        &self,
        f: impl FnOnce(&mut dyn DatabaseExecutor) -> R,
    ) -> Result<R, SqlFluentError> {
        let mut slot = self.slot();
        let executor = slot.as_mut().ok_or(SqlFluentError::ConnectionClosed)?;
        Ok(f(executor.as_mut()))
    }

    /// Run several `;`-separated statements without parameters, e.g. schema setup.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConnectionClosed` after `close`, or the driver error.
    pub fn execute_batch(&self, sql: &str) -> Result<(), SqlFluentError> {
        self.with_executor(|executor| executor.execute_batch(sql))?
    }

    /// # Errors
    /// Returns `SqlFluentError::ConnectionClosed` after `close`.
    pub fn driver_kind(&self) -> Result<DriverKind, SqlFluentError> {
        self.with_executor(|executor| executor.driver_kind())
    }

    /// Release the connection. Closing twice is a no-op.
    pub fn close(&self) {
        if let Some(executor) = self.slot().take() {
            tracing::info!(driver = ?executor.driver_kind(), "closed connection");
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.slot().is_none()
    }

    /// A fresh builder with no table and no pending statement.
    #[must_use]
    pub fn builder(&self) -> QueryBuilder {
        QueryBuilder::new(self.clone())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.is_closed())
            .finish()
    }
}

lazy_static! {
    static ref GLOBAL: ConnectionManager = ConnectionManager::new();
}

/// Owns at most one connection and hands out builders bound to it.
///
/// ```rust
/// use sql_fluent::prelude::*;
///
/// # fn main() -> Result<(), SqlFluentError> {
/// let manager = ConnectionManager::new();
/// assert!(matches!(manager.instance(None), Err(SqlFluentError::ConfigError(_))));
///
/// let desc = ConnectionDescriptor::sqlite(":memory:");
/// let mut builder = manager.instance(Some(&desc))?;
/// builder.table("pets");
///
/// // Later acquisitions reuse the connection and start table-less.
/// let again = manager.instance(None)?;
/// assert_eq!(again.table_name(), "");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConnectionManager {
    current: Mutex<Option<Connection>>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide manager.
    #[must_use]
    pub fn global() -> &'static ConnectionManager {
        &GLOBAL
    }

    fn current(&self) -> MutexGuard<'_, Option<Connection>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A builder bound to the managed connection, opening it on first use.
    ///
    /// While a connection is held, `desc` is ignored. After [`ConnectionManager::close`],
    /// passing a descriptor reconnects; passing `None` returns a builder whose operations
    /// fail with `ConnectionClosed`.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConfigError` when no connection exists and no descriptor
    /// is supplied, or any error from opening the connection.
    pub fn instance(
        &self,
        desc: Option<&ConnectionDescriptor>,
    ) -> Result<QueryBuilder, SqlFluentError> {
        let mut current = self.current();
        if let Some(conn) = current.as_ref() {
            if !conn.is_closed() || desc.is_none() {
                return Ok(conn.builder());
            }
        }
        let desc = desc.ok_or_else(|| {
            SqlFluentError::ConfigError(
                "no connection descriptor supplied and no connection is open".into(),
            )
        })?;
        let conn = Connection::open(desc)?;
        let builder = conn.builder();
        *current = Some(conn);
        Ok(builder)
    }

    /// Manage an already opened connection, replacing any previous one.
    pub fn install(&self, conn: Connection) {
        if let Some(previous) = self.current().replace(conn) {
            previous.close();
        }
    }

    #[must_use]
    pub fn connection(&self) -> Option<Connection> {
        self.current().clone()
    }

    /// Close the managed connection. Builders that still hold it fail afterwards.
    pub fn close(&self) {
        if let Some(conn) = self.current().as_ref() {
            conn.close();
        }
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;

    #[test]
    fn first_acquisition_needs_a_descriptor() {
        let manager = ConnectionManager::new();
        assert!(matches!(
            manager.instance(None),
            Err(SqlFluentError::ConfigError(_))
        ));
    }

    #[test]
    fn later_acquisitions_share_the_connection() {
        let manager = ConnectionManager::new();
        let desc = ConnectionDescriptor::sqlite(":memory:");
        let first = manager.instance(Some(&desc)).unwrap();
        first
            .connection()
            .execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY);")
            .unwrap();

        let mut second = manager.instance(None).unwrap();
        second.table("t");
        assert!(second.all().unwrap().is_empty());
    }

    #[test]
    fn closed_connections_fail_hard() {
        let manager = ConnectionManager::new();
        let desc = ConnectionDescriptor::sqlite(":memory:");
        let conn = manager.instance(Some(&desc)).unwrap().connection().clone();
        manager.close();
        assert!(conn.is_closed());
        assert!(matches!(
            conn.execute_batch("SELECT 1"),
            Err(SqlFluentError::ConnectionClosed)
        ));

        let reopened = manager.instance(Some(&desc)).unwrap();
        assert!(!reopened.connection().is_closed());
    }
}
