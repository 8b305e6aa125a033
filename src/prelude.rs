//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::ConnectionDescriptor;
pub use crate::connection::{Connection, ConnectionManager};
pub use crate::error::{ErrorInfo, SqlFluentError};
pub use crate::executor::DatabaseExecutor;
pub use crate::fields::Fields;
pub use crate::query_builder::{Condition, Direction, JoinKind, Operator, QueryBuilder};
pub use crate::results::{FetchMode, FromRecord, Record, ResultSet, StatementHandle};
pub use crate::translation::translate_placeholders;
pub use crate::types::{DriverKind, Params, RowValues};

#[cfg(feature = "postgres")]
pub use crate::postgres::PostgresExecutor;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteExecutor;
