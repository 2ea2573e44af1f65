use crate::error::{GatewayError, Result};
use crate::pool::{release_quietly, Connection, ConnectionProvider, ExecuteOptions, Row};
use crate::query::identifier::{resolve_table_name, TableNamePolicy};
use crate::schema::SchemaCatalog;
use std::sync::Arc;
use tracing::{debug, info};

/// Read-only `SELECT *` access to tables by name.
pub struct QueryGateway {
    catalog: Arc<SchemaCatalog>,
    provider: Arc<dyn ConnectionProvider>,
    policy: TableNamePolicy,
}

impl QueryGateway {
    pub fn new(
        catalog: Arc<SchemaCatalog>,
        provider: Arc<dyn ConnectionProvider>,
        policy: TableNamePolicy,
    ) -> Self {
        Self {
            catalog,
            provider,
            policy,
        }
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn resolve_table(&self, raw: &str) -> Result<String> {
        resolve_table_name(&self.catalog, self.policy, raw)
    }

    /// Fails with `InvalidIdentifier` before touching the database when the
    /// name does not pass the gate.
    pub async fn select_all(&self, raw: &str) -> Result<Vec<Row>> {
        let table = self.resolve_table(raw)?;

        let mut conn = self.provider.acquire().await?;
        let result = select_rows(conn.as_mut(), &table).await;
        release_quietly(conn, "select").await;

        let rows = result?;
        info!("Selected {} rows from {}", rows.len(), table);
        Ok(rows)
    }
}

async fn select_rows(conn: &mut dyn Connection, table: &str) -> Result<Vec<Row>> {
    let sql = format!("SELECT * FROM {}", table);
    debug!("Executing query: {}", sql);

    let result = conn
        .execute(&sql, &[], ExecuteOptions::named_rows())
        .await
        .map_err(|e| GatewayError::QueryFailed {
            table: table.to_string(),
            cause: e.message,
        })?;

    Ok(result.rows)
}
