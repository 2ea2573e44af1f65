mod health;
mod schema;
mod select;

pub use health::{health_check, hello};
pub use schema::{create_tables, drop_tables, populate_tables, SchemaResponse};
pub use select::{select_table, SelectQuery};

use crate::pool::ConnectionProvider;
use crate::query::QueryGateway;
use crate::schema::SchemaApplier;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state for all routes
pub struct AppState {
    pub applier: SchemaApplier,
    pub gateway: QueryGateway,
    pub provider: Arc<dyn ConnectionProvider>,
    pub start_time: Instant,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/health", get(health_check))
        .route("/create-table", post(create_tables))
        .route("/populate-table", post(populate_tables))
        .route("/drop-table", post(drop_tables))
        .route("/select-table", get(select_table))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
