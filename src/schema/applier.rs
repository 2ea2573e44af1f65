//! Runs catalog DDL against the database, one auto-committed statement at a
//! time.
//!
//! A failing statement is logged and recorded in the outcome list. Under the
//! default [`FaultIsolationMode::ContinuePastFailure`] the remaining
//! statements still run, so an existing table never blocks creation of the
//! independent ones and a half-built schema is repaired by running again.
//! Only failing to acquire a connection fails the whole operation.

use crate::error::Result;
use crate::pool::{release_quietly, Connection, ConnectionProvider, ExecuteOptions};
use crate::schema::catalog::SchemaCatalog;
use crate::schema::seeder::seed_statements;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultIsolationMode {
    /// Record the failure and run the next statement.
    #[default]
    ContinuePastFailure,
    /// Record the failure and stop.
    AbortOnFirstFailure,
}

impl FromStr for FaultIsolationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" | "continue_past_failure" => Ok(Self::ContinuePastFailure),
            "abort" | "abort_on_first_failure" => Ok(Self::AbortOnFirstFailure),
            other => Err(format!(
                "Invalid fault isolation mode '{}' (expected 'continue' or 'abort')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaOperation {
    Provision,
    Populate,
    Teardown,
}

impl SchemaOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaOperation::Provision => "provision",
            SchemaOperation::Populate => "populate",
            SchemaOperation::Teardown => "teardown",
        }
    }
}

/// Result of one attempted statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementOutcome {
    pub statement_index: usize,
    /// Table the statement acts on
    pub target: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_state: Option<String>,
}

pub struct SchemaApplier {
    catalog: Arc<SchemaCatalog>,
    provider: Arc<dyn ConnectionProvider>,
    mode: FaultIsolationMode,
    // one DDL run at a time within this process
    run_lock: Mutex<()>,
}

impl SchemaApplier {
    pub fn new(
        catalog: Arc<SchemaCatalog>,
        provider: Arc<dyn ConnectionProvider>,
        mode: FaultIsolationMode,
    ) -> Self {
        Self {
            catalog,
            provider,
            mode,
            run_lock: Mutex::new(()),
        }
    }

    pub async fn apply_schema(&self) -> Result<Vec<StatementOutcome>> {
        let statements = self.catalog.creation_statements();
        self.run(SchemaOperation::Provision, statements).await
    }

    pub async fn drop_schema(&self, cascade: bool) -> Result<Vec<StatementOutcome>> {
        let statements = self.catalog.drop_statements(cascade);
        self.run(SchemaOperation::Teardown, statements).await
    }

    pub async fn populate(&self) -> Result<Vec<StatementOutcome>> {
        self.run(SchemaOperation::Populate, seed_statements()).await
    }

    async fn run(
        &self,
        operation: SchemaOperation,
        statements: Vec<String>,
    ) -> Result<Vec<StatementOutcome>> {
        let _guard = self.run_lock.lock().await;

        let mut conn = self.provider.acquire().await?;
        info!(
            "Connected to {} for {} ({} statements)",
            self.provider.database(),
            operation.as_str(),
            statements.len()
        );

        let outcomes = self.execute_all(conn.as_mut(), &statements).await;
        release_quietly(conn, operation.as_str()).await;

        let failed = outcomes.iter().filter(|o| !o.succeeded).count();
        info!(
            "{} finished: {} succeeded, {} failed",
            operation.as_str(),
            outcomes.len() - failed,
            failed
        );

        Ok(outcomes)
    }

    async fn execute_all(
        &self,
        conn: &mut dyn Connection,
        statements: &[String],
    ) -> Vec<StatementOutcome> {
        let mut outcomes = Vec::with_capacity(statements.len());

        for (statement_index, statement) in statements.iter().enumerate() {
            let target = statement_target(statement);

            let outcome = match conn.execute(statement, &[], ExecuteOptions::statement()).await {
                Ok(_) => {
                    debug!("Statement {} on {} succeeded", statement_index, target);
                    StatementOutcome {
                        statement_index,
                        target,
                        succeeded: true,
                        error_message: None,
                        sql_state: None,
                    }
                }
                Err(e) => {
                    warn!(
                        "Error executing statement {} on {}: {} (statement: {})",
                        statement_index, target, e, statement
                    );
                    StatementOutcome {
                        statement_index,
                        target,
                        succeeded: false,
                        error_message: Some(e.message),
                        sql_state: e.sql_state,
                    }
                }
            };

            let stop = !outcome.succeeded && self.mode == FaultIsolationMode::AbortOnFirstFailure;
            outcomes.push(outcome);

            if stop {
                warn!(
                    "Stopping after statement {}; {} statements not attempted",
                    statement_index,
                    statements.len() - statement_index - 1
                );
                break;
            }
        }

        outcomes
    }
}

/// Table named by a CREATE TABLE / DROP TABLE / INSERT INTO statement.
fn statement_target(statement: &str) -> String {
    let mut words = statement.split_whitespace();
    let name = match (words.next(), words.next()) {
        (Some(_), Some(kw)) if kw.eq_ignore_ascii_case("TABLE") || kw.eq_ignore_ascii_case("INTO") => {
            words.next()
        }
        _ => None,
    };

    name.map(|n| {
        n.trim_end_matches(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .to_string()
    })
    .unwrap_or_default()
}
