//! Schema lifecycle endpoints
//!
//! - POST /create-table   - create every catalog table
//! - POST /populate-table - insert the sample data set
//! - POST /drop-table     - drop every catalog table (cascading)
//!
//! All three answer 200 with the per-statement outcomes unless no connection
//! could be obtained. Callers inspect `failed` / `outcomes` for statement errors.

use crate::api::AppState;
use crate::error::Result;
use crate::schema::{SchemaOperation, StatementOutcome};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub status: String,
    pub operation: SchemaOperation,
    pub statements: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<StatementOutcome>,
    pub execution_time_ms: u64,
}

impl SchemaResponse {
    fn new(operation: SchemaOperation, outcomes: Vec<StatementOutcome>, started: Instant) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
        let failed = outcomes.len() - succeeded;

        Self {
            status: if failed == 0 {
                "completed".to_string()
            } else {
                "completed_with_errors".to_string()
            },
            operation,
            statements: outcomes.len(),
            succeeded,
            failed,
            outcomes,
            execution_time_ms: started.elapsed().as_millis() as u64,
        }
    }
}

pub async fn create_tables(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let started = Instant::now();
    let outcomes = state.applier.apply_schema().await?;

    Ok((
        StatusCode::OK,
        Json(SchemaResponse::new(SchemaOperation::Provision, outcomes, started)),
    ))
}

pub async fn populate_tables(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let started = Instant::now();
    let outcomes = state.applier.populate().await?;

    Ok((
        StatusCode::OK,
        Json(SchemaResponse::new(SchemaOperation::Populate, outcomes, started)),
    ))
}

pub async fn drop_tables(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let started = Instant::now();
    let outcomes = state.applier.drop_schema(true).await?;

    Ok((
        StatusCode::OK,
        Json(SchemaResponse::new(SchemaOperation::Teardown, outcomes, started)),
    ))
}
