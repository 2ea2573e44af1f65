use crate::config::Config;
use crate::error::{ExecutionError, GatewayError, ReleaseError, Result};
use crate::pool::value::Row;
use async_trait::async_trait;
use deadpool_postgres::{Config as PoolConfig, Object, Pool, Runtime};
use postgres_types::ToSql;
use tokio_postgres::NoTls;
use tracing::{debug, info, warn};

/// How the caller wants rows handed back from `Connection::execute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFormat {
    /// Statement produces no rows worth keeping (DDL, DML).
    Discard,
    /// Column-named mappings.
    Named,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOptions {
    pub row_format: RowFormat,
}

impl ExecuteOptions {
    pub fn statement() -> Self {
        Self {
            row_format: RowFormat::Discard,
        }
    }

    pub fn named_rows() -> Self {
        Self {
            row_format: RowFormat::Named,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub rows_affected: u64,
    /// Empty under `RowFormat::Discard`.
    pub rows: Vec<Row>,
}

/// One live database session. Every statement sent outside an explicit
/// transaction commits on its own.
#[async_trait]
pub trait Connection: Send {
    async fn execute(
        &mut self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
        options: ExecuteOptions,
    ) -> std::result::Result<ExecutionResult, ExecutionError>;

    async fn release(self: Box<Self>) -> std::result::Result<(), ReleaseError>;
}

/// Yields one connection per logical operation.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn Connection>>;

    /// Name of the target database, for messages.
    fn database(&self) -> &str;
}

pub struct PostgresProvider {
    pool: Pool,
    database: String,
}

impl PostgresProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let pool = create_pool(config)?;

        info!(
            "Connection provider ready for database '{}' (max {} connections)",
            config.database_name, config.max_connections
        );

        Ok(Self {
            pool,
            database: config.database_name.clone(),
        })
    }
}

#[async_trait]
impl ConnectionProvider for PostgresProvider {
    async fn acquire(&self) -> Result<Box<dyn Connection>> {
        let client = self.pool.get().await.map_err(|e| GatewayError::ConnectionFailed {
            database: self.database.clone(),
            cause: e.to_string(),
        })?;

        debug!("Acquired connection to {}", self.database);
        Ok(Box::new(PostgresConnection { client }))
    }

    fn database(&self) -> &str {
        &self.database
    }
}

struct PostgresConnection {
    client: Object,
}

#[async_trait]
impl Connection for PostgresConnection {
    async fn execute(
        &mut self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
        options: ExecuteOptions,
    ) -> std::result::Result<ExecutionResult, ExecutionError> {
        match options.row_format {
            RowFormat::Discard => {
                let rows_affected = self.client.execute(statement, params).await?;
                Ok(ExecutionResult {
                    rows_affected,
                    rows: Vec::new(),
                })
            }
            RowFormat::Named => {
                let rows = self.client.query(statement, params).await?;
                let rows = rows
                    .iter()
                    .map(Row::from_pg)
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(ExecutionResult {
                    rows_affected: rows.len() as u64,
                    rows,
                })
            }
        }
    }

    async fn release(self: Box<Self>) -> std::result::Result<(), ReleaseError> {
        if self.client.is_closed() {
            // Keep a dead session out of the pool
            let _ = Object::take(self.client);
            warn!("Discarded closed connection instead of returning it to the pool");
            return Err(ReleaseError {
                message: "connection was closed by the server".to_string(),
            });
        }

        drop(self.client);
        Ok(())
    }
}

fn create_pool(config: &Config) -> Result<Pool> {
    let mut cfg = PoolConfig::new();
    cfg.url = Some(config.database_url.clone());

    if let Some(timeout) = config.statement_timeout {
        cfg.options = Some(format!("-c statement_timeout={}", timeout.as_millis()));
    }

    cfg.pool = Some(deadpool_postgres::PoolConfig {
        max_size: config.max_connections as usize,
        timeouts: deadpool_postgres::Timeouts {
            wait: Some(config.connect_timeout),
            create: Some(config.connect_timeout),
            recycle: Some(config.connect_timeout),
        },
        ..Default::default()
    });

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| GatewayError::Internal(format!("Failed to create pool: {}", e)))
}
