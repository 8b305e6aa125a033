use tokio::runtime::{Builder, Runtime};
use tokio_postgres::{Client, NoTls};

use super::params::as_refs;
use super::query::build_result_set;
use crate::config::ConnectionDescriptor;
use crate::error::SqlFluentError;
use crate::executor::DatabaseExecutor;
use crate::results::ResultSet;
use crate::translation::translate_placeholders;
use crate::types::{DriverKind, Params};

/// Postgres connection driven synchronously on its own current-thread runtime.
///
/// The connection task only makes progress while a call is blocking on the runtime,
/// which is every call this type makes.
pub struct PostgresExecutor {
    runtime: Runtime,
    client: Client,
}

impl PostgresExecutor {
    /// Connect using the descriptor's host, port, database and credentials.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConfigError` for missing fields,
    /// `SqlFluentError::ConnectionError` if the runtime cannot start, or the driver error
    /// if the server refuses the connection.
    pub fn connect(desc: &ConnectionDescriptor) -> Result<Self, SqlFluentError> {
        desc.validate()?;
        let mut cfg = tokio_postgres::Config::new();
        if let Some(host) = &desc.host {
            cfg.host(host);
        }
        if let Some(port) = desc.port {
            cfg.port(port);
        }
        if let Some(dbname) = &desc.database {
            cfg.dbname(dbname);
        }
        if let Some(user) = &desc.username {
            cfg.user(user);
        }
        if let Some(password) = &desc.password {
            cfg.password(password);
        }

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                SqlFluentError::ConnectionError(format!("failed to start postgres runtime: {e}"))
            })?;
        let (client, connection) = runtime.block_on(cfg.connect(NoTls))?;
        runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "postgres connection terminated");
            }
        });
        tracing::info!(dsn = %desc.dsn(), "opened postgres connection");

        Ok(Self { runtime, client })
    }
}

impl std::fmt::Debug for PostgresExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresExecutor")
            .field("closed", &self.client.is_closed())
            .finish()
    }
}

impl DatabaseExecutor for PostgresExecutor {
    fn driver_kind(&self) -> DriverKind {
        DriverKind::Postgres
    }

    fn execute_batch(&mut self, sql: &str) -> Result<(), SqlFluentError> {
        self.runtime.block_on(self.client.batch_execute(sql))?;
        Ok(())
    }

    fn run(&mut self, sql: &str, params: &Params) -> Result<ResultSet, SqlFluentError> {
        let translated = translate_placeholders(sql, params)?;
        let refs = as_refs(&translated.values);
        let client = &self.client;

        self.runtime.block_on(async {
            let stmt = client.prepare(translated.sql.as_ref()).await?;
            if stmt.columns().is_empty() {
                let affected = client.execute(&stmt, &refs).await?;
                let affected = usize::try_from(affected).map_err(|e| {
                    SqlFluentError::ExecutionError(format!(
                        "postgres affected rows conversion error: {e}"
                    ))
                })?;
                return Ok(ResultSet::affected(affected));
            }
            let rows = client.query(&stmt, &refs).await?;
            build_result_set(&stmt, &rows)
        })
    }

    fn last_insert_id(&mut self) -> Option<String> {
        let row = self
            .runtime
            .block_on(self.client.query_one("SELECT LASTVAL()::text", &[]))
            .ok()?;
        row.try_get::<_, String>(0).ok()
    }
}
