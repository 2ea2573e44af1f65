use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Connection failed to {database}: {cause}")]
    ConnectionFailed { database: String, cause: String },

    #[error("Invalid table identifier: {name:?}")]
    InvalidIdentifier { name: String },

    #[error("Query failed on {table}: {cause}")]
    QueryFailed { table: String, cause: String },

    #[error("Invalid schema catalog: {cause}")]
    InvalidCatalog { cause: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A single statement failed at the database. Recorded into outcome lists,
/// never surfaced as the result of a schema operation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ExecutionError {
    pub message: String,
    pub sql_state: Option<String>,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sql_state: None,
        }
    }

    pub fn with_sql_state(mut self, code: impl Into<String>) -> Self {
        self.sql_state = Some(code.into());
        self
    }
}

/// Returning a connection failed. Logged only.
#[derive(Debug, Clone, Error)]
#[error("Failed to release connection: {message}")]
pub struct ReleaseError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            GatewayError::ConnectionFailed { database, cause } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "connection_failed".to_string(),
                    message: format!("Failed to connect to database '{}'", database),
                    table: None,
                    cause: Some(cause.clone()),
                },
            ),
            GatewayError::InvalidIdentifier { name } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "invalid_identifier".to_string(),
                    message: format!("'{}' is not an allowed table name", name),
                    table: None,
                    cause: None,
                },
            ),
            GatewayError::QueryFailed { table, cause } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "query_failed".to_string(),
                    message: format!("Error executing query on '{}'", table),
                    table: Some(table.clone()),
                    cause: Some(cause.clone()),
                },
            ),
            GatewayError::InvalidCatalog { cause } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "invalid_catalog".to_string(),
                    message: "Schema catalog failed validation".to_string(),
                    table: None,
                    cause: Some(cause.clone()),
                },
            ),
            GatewayError::InvalidRequest { message } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "invalid_request".to_string(),
                    message: message.clone(),
                    table: None,
                    cause: None,
                },
            ),
            GatewayError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "internal_error".to_string(),
                    message: msg.clone(),
                    table: None,
                    cause: None,
                },
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<tokio_postgres::Error> for ExecutionError {
    fn from(err: tokio_postgres::Error) -> Self {
        match err.as_db_error() {
            Some(db) => ExecutionError::new(db.message()).with_sql_state(db.code().code()),
            None => ExecutionError::new(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
