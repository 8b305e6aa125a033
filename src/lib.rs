//! Fluent, synchronous SQL statement building and execution.
//!
//! A [`QueryBuilder`] assembles one statement at a time through chained calls, binds its
//! values safely, runs it on a shared [`Connection`] and returns rows as [`Record`]s or as
//! any type implementing [`FromRecord`]. Backends: `SQLite` (rusqlite) and `PostgreSQL`
//! (tokio-postgres driven on a private runtime).
//!
//! Driver failures are soft: terminal calls return `false`, `None` or an empty vector and
//! the detail is available from [`QueryBuilder::errors`]. Structural misuse (no table,
//! no configuration, a closed connection, a malformed condition) is a hard `Err`.

pub mod prelude;

pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod fields;
pub mod query_builder;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::ConnectionDescriptor;
pub use connection::{Connection, ConnectionManager};
pub use error::{ErrorInfo, SqlFluentError};
pub use executor::{DatabaseExecutor, open_executor};
pub use fields::Fields;
pub use query_builder::{Condition, Direction, JoinKind, Operator, QueryBuilder};
pub use results::{FetchMode, FromRecord, Record, ResultSet, StatementHandle};
pub use translation::translate_placeholders;
pub use types::{DriverKind, Params, RowValues};
