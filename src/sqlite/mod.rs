// SQLite backend, split into:
// - params: conversion from `RowValues` to rusqlite values
// - query: row extraction and result building
// - executor: the `DatabaseExecutor` implementation

pub mod executor;
pub mod params;
pub mod query;

pub use executor::SqliteExecutor;
pub use params::SqliteParams;
pub use query::build_result_set;
