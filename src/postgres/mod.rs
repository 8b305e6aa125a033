// PostgreSQL backend, split into:
// - params: `ToSql` for `RowValues`
// - query: row extraction and result building
// - executor: the `DatabaseExecutor` implementation

pub mod executor;
pub mod params;
pub mod query;

pub use executor::PostgresExecutor;
pub use query::build_result_set;
