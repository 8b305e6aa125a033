use serde::{Deserialize, Serialize};

use crate::error::SqlFluentError;
use crate::types::DriverKind;

/// Everything needed to open one database connection.
///
/// Only the fields relevant to `driver` are required: `path` for `SQLite`,
/// `host` and `database` for Postgres. Credentials are optional and passed through as-is.
///
/// ```rust
/// use sql_fluent::prelude::*;
///
/// let desc = ConnectionDescriptor::postgres("db.local", "pets").with_credentials("app", "secret");
/// assert_eq!(desc.dsn(), "postgres:host=db.local;dbname=pets");
///
/// let desc = ConnectionDescriptor::from_json(r#"{"driver": "sqlite", "path": ":memory:"}"#)?;
/// assert_eq!(desc.dsn(), "sqlite::memory:");
/// # Ok::<(), SqlFluentError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    pub driver: DriverKind,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default, alias = "dbname")]
    pub database: Option<String>,
    #[serde(default, alias = "user")]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, alias = "file")]
    pub path: Option<String>,
}

impl ConnectionDescriptor {
    #[must_use]
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            driver: DriverKind::Sqlite,
            host: None,
            port: None,
            database: None,
            username: None,
            password: None,
            path: Some(path.into()),
        }
    }

    #[must_use]
    pub fn postgres(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            driver: DriverKind::Postgres,
            host: Some(host.into()),
            port: None,
            database: Some(database.into()),
            username: None,
            password: None,
            path: None,
        }
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Parse a descriptor from a JSON document.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConfigError` if the JSON is malformed or the descriptor
    /// lacks a field its driver needs.
    pub fn from_json(json: &str) -> Result<Self, SqlFluentError> {
        let desc: Self = serde_json::from_str(json)
            .map_err(|e| SqlFluentError::ConfigError(format!("invalid descriptor: {e}")))?;
        desc.validate()?;
        Ok(desc)
    }

    /// Check that the fields required by the driver kind are present.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConfigError` naming the first missing field.
    pub fn validate(&self) -> Result<(), SqlFluentError> {
        fn required(field: &Option<String>, name: &str) -> Result<(), SqlFluentError> {
            match field.as_deref() {
                Some(value) if !value.trim().is_empty() => Ok(()),
                _ => Err(SqlFluentError::ConfigError(format!("{name} is required"))),
            }
        }

        match self.driver {
            DriverKind::Sqlite => required(&self.path, "path"),
            DriverKind::Postgres => {
                required(&self.host, "host")?;
                required(&self.database, "database")
            }
        }
    }

    /// Connection string for this descriptor, without credentials.
    #[must_use]
    pub fn dsn(&self) -> String {
        let scheme = self.driver.scheme();
        match self.driver {
            DriverKind::Sqlite => format!("{scheme}:{}", self.path.as_deref().unwrap_or_default()),
            DriverKind::Postgres => {
                let mut dsn = format!(
                    "{scheme}:host={};dbname={}",
                    self.host.as_deref().unwrap_or_default(),
                    self.database.as_deref().unwrap_or_default()
                );
                if let Some(port) = self.port {
                    dsn.push_str(&format!(";port={port}"));
                }
                dsn
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_both_dsn_variants() {
        assert_eq!(
            ConnectionDescriptor::sqlite("/tmp/app.db").dsn(),
            "sqlite:/tmp/app.db"
        );
        assert_eq!(
            ConnectionDescriptor::postgres("localhost", "app")
                .with_port(5433)
                .dsn(),
            "postgres:host=localhost;dbname=app;port=5433"
        );
    }

    #[test]
    fn credentials_pass_through() {
        let desc = ConnectionDescriptor::postgres("h", "d").with_credentials("u", " p w ");
        assert_eq!(desc.username.as_deref(), Some("u"));
        assert_eq!(desc.password.as_deref(), Some(" p w "));
    }

    #[test]
    fn json_accepts_driver_aliases() {
        let desc = ConnectionDescriptor::from_json(
            r#"{"driver": "client-server", "host": "h", "dbname": "d", "user": "u"}"#,
        )
        .unwrap();
        assert_eq!(desc.driver, DriverKind::Postgres);
        assert_eq!(desc.database.as_deref(), Some("d"));
        assert_eq!(desc.username.as_deref(), Some("u"));
        assert_eq!(desc.password, None);
    }

    #[test]
    fn validation_names_missing_field() {
        let err = ConnectionDescriptor::from_json(r#"{"driver": "postgres", "host": "h"}"#)
            .unwrap_err();
        assert!(matches!(err, SqlFluentError::ConfigError(ref m) if m == "database is required"));

        let err = ConnectionDescriptor::from_json(r#"{"driver": "relational-file"}"#).unwrap_err();
        assert!(matches!(err, SqlFluentError::ConfigError(ref m) if m == "path is required"));

        assert!(ConnectionDescriptor::from_json("not json").is_err());
    }
}
