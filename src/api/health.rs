use crate::api::AppState;
use crate::pool::release_quietly;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database: String,
    database_connected: bool,
    catalog_tables: usize,
    uptime_seconds: u64,
}

pub async fn hello() -> &'static str {
    "Hello World!"
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database_connected = match state.provider.acquire().await {
        Ok(conn) => {
            release_quietly(conn, "health check").await;
            true
        }
        Err(_) => false,
    };

    Json(HealthResponse {
        status: if database_connected {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        database: state.provider.database().to_string(),
        database_connected,
        catalog_tables: state.gateway.catalog().tables().len(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, send};
    use crate::pool::testing::FakeDatabase;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_reports_connection_state() {
        let db = FakeDatabase::new();
        let app = app(&db);

        let (status, body) = send(&app, "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["catalog_tables"], 10);
        assert_eq!((db.acquired(), db.released()), (1, 1));

        db.fail_acquire(true);
        let (status, body) = send(&app, "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database_connected"], false);
    }

    #[tokio::test]
    async fn test_hello() {
        let (status, body) = send(&app(&FakeDatabase::new()), "GET", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Hello World!");
    }
}
