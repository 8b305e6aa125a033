use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlFluentError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No table was set for the statement")]
    MissingTable,

    #[error("The database connection has been closed")]
    ConnectionClosed,

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    #[error("Conversion error: {0}")]
    ConversionError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl From<serde_json::Error> for SqlFluentError {
    fn from(err: serde_json::Error) -> Self {
        SqlFluentError::ConversionError(err.to_string())
    }
}

/// Driver diagnostics captured from a failed statement.
///
/// Mirrors the usual three-part shape: a five character SQLSTATE, the
/// driver-specific error code and the driver message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub sqlstate: String,
    pub code: Option<i64>,
    pub message: Option<String>,
}

impl ErrorInfo {
    /// The "no error" marker returned for successful statements.
    #[must_use]
    pub fn success() -> Self {
        Self {
            sqlstate: "00000".to_string(),
            code: None,
            message: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.sqlstate == "00000"
    }
}

impl From<&SqlFluentError> for ErrorInfo {
    fn from(err: &SqlFluentError) -> Self {
        match err {
            #[cfg(feature = "sqlite")]
            SqlFluentError::SqliteError(rusqlite::Error::SqliteFailure(ffi, msg)) => ErrorInfo {
                sqlstate: "HY000".to_string(),
                code: Some(i64::from(ffi.extended_code)),
                message: Some(msg.clone().unwrap_or_else(|| ffi.to_string())),
            },
            #[cfg(feature = "postgres")]
            SqlFluentError::PostgresError(pg) => ErrorInfo {
                sqlstate: pg
                    .code()
                    .map_or_else(|| "HY000".to_string(), |state| state.code().to_string()),
                code: None,
                message: Some(
                    pg.as_db_error()
                        .map_or_else(|| pg.to_string(), |db| db.message().to_string()),
                ),
            },
            other => ErrorInfo {
                sqlstate: "HY000".to_string(),
                code: None,
                message: Some(other.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_marker() {
        let info = ErrorInfo::success();
        assert!(info.is_success());
        assert_eq!(info.code, None);
    }

    #[test]
    fn plumbing_errors_map_to_general_state() {
        let info = ErrorInfo::from(&SqlFluentError::ParameterError("missing :id".into()));
        assert_eq!(info.sqlstate, "HY000");
        assert_eq!(
            info.message.as_deref(),
            Some("Parameter error: missing :id")
        );
    }
}
