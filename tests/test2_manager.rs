#![cfg(feature = "sqlite")]

use sql_fluent::prelude::*;
use tempfile::TempDir;

fn file_descriptor(dir: &TempDir) -> ConnectionDescriptor {
    let path = dir.path().join("manager.db");
    ConnectionDescriptor::sqlite(path.to_string_lossy().into_owned())
}

#[test]
fn instance_requires_configuration_first() {
    let manager = ConnectionManager::new();
    let err = manager.instance(None).unwrap_err();
    assert!(matches!(err, SqlFluentError::ConfigError(_)));
    assert!(manager.connection().is_none());
}

#[test]
fn instance_rejects_incomplete_descriptors() {
    let manager = ConnectionManager::new();
    let desc = ConnectionDescriptor::from_json(r#"{"driver": "relational-file"}"#);
    assert!(matches!(desc, Err(SqlFluentError::ConfigError(_))));

    let mut desc = ConnectionDescriptor::sqlite("unused.db");
    desc.path = None;
    assert!(matches!(
        manager.instance(Some(&desc)),
        Err(SqlFluentError::ConfigError(_))
    ));
}

#[test]
fn every_acquisition_starts_table_less() -> Result<(), SqlFluentError> {
    let dir = TempDir::new().unwrap();
    let manager = ConnectionManager::new();
    let desc = file_descriptor(&dir);

    let mut first = manager.instance(Some(&desc))?;
    first
        .connection()
        .execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);")?;
    first.table("notes");
    first.insert([("body", "hello")])?;

    let other = ConnectionDescriptor::sqlite(":memory:");
    let mut second = manager.instance(Some(&other))?;
    assert_eq!(second.table_name(), "");
    assert!(matches!(second.all(), Err(SqlFluentError::MissingTable)));

    // Same connection, so the row written through `first` is visible.
    second.table("notes");
    assert_eq!(
        second.first_column("body")?,
        Some(RowValues::from("hello"))
    );
    Ok(())
}

#[test]
fn close_then_operate_fails_hard() -> Result<(), SqlFluentError> {
    let manager = ConnectionManager::new();
    let desc = ConnectionDescriptor::sqlite(":memory:");
    let mut builder = manager.instance(Some(&desc))?;
    builder
        .connection()
        .execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY);")?;
    builder.table("t");

    manager.close();
    assert!(matches!(builder.all(), Err(SqlFluentError::ConnectionClosed)));
    assert!(matches!(
        builder.insert([("id", 1)]),
        Err(SqlFluentError::ConnectionClosed)
    ));
    assert!(matches!(
        builder.last_insert_id(),
        Err(SqlFluentError::ConnectionClosed)
    ));

    let mut stale = manager.instance(None)?;
    stale.table("t");
    assert!(matches!(stale.first(), Err(SqlFluentError::ConnectionClosed)));

    let mut fresh = manager.instance(Some(&desc))?;
    fresh
        .connection()
        .execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY);")?;
    fresh.table("t");
    assert!(fresh.all()?.is_empty());
    Ok(())
}

#[test]
fn builder_close_releases_the_shared_connection() -> Result<(), SqlFluentError> {
    let manager = ConnectionManager::new();
    let mut builder = manager.instance(Some(&ConnectionDescriptor::sqlite(":memory:")))?;
    let peer = manager.instance(None)?;

    builder.close();
    assert!(builder.last_statement().is_none());
    assert!(peer.connection().is_closed());
    Ok(())
}

#[test]
fn installed_connections_are_reused() -> Result<(), SqlFluentError> {
    let manager = ConnectionManager::new();
    let conn = Connection::from_executor(SqliteExecutor::from_connection(
        rusqlite::Connection::open_in_memory()?,
    ));
    manager.install(conn.clone());

    let builder = manager.instance(None)?;
    assert_eq!(builder.connection().driver_kind()?, DriverKind::Sqlite);
    conn.close();
    assert!(builder.connection().is_closed());
    Ok(())
}

#[test]
fn global_manager_is_shared() {
    let a: *const ConnectionManager = ConnectionManager::global();
    let b: *const ConnectionManager = ConnectionManager::global();
    assert_eq!(a, b);
}
