use crate::api::AppState;
use crate::error::{GatewayError, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct SelectQuery {
    pub table: Option<String>,
}

/// GET /select-table?table=<name>
pub async fn select_table(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelectQuery>,
) -> Result<impl IntoResponse> {
    let table = query.table.ok_or_else(|| GatewayError::InvalidRequest {
        message: "Missing 'table' query parameter".to_string(),
    })?;

    debug!("Select requested for table {:?}", table);

    let rows = state.gateway.select_all(&table).await?;

    Ok((StatusCode::OK, Json(rows)))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, send};
    use crate::pool::testing::FakeDatabase;
    use crate::pool::{Row, SqlValue};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_select_empty_table() {
        let db = FakeDatabase::new();
        let app = app(&db);
        send(&app, "POST", "/create-table").await;

        let (status, body) = send(&app, "GET", "/select-table?table=Account").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_select_returns_row_objects() {
        let db = FakeDatabase::new();
        let mut row = Row::new();
        row.push("OrderID", SqlValue::Int(1));
        row.push("OrderCost", SqlValue::Decimal("18.25".to_string()));
        db.set_rows("Orders", vec![row]);

        let (status, body) = send(&app(&db), "GET", "/select-table?table=orders").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([{ "OrderID": 1, "OrderCost": "18.25" }]));
    }

    #[tokio::test]
    async fn test_select_injection_rejected() {
        let db = FakeDatabase::new();
        let (status, body) = send(
            &app(&db),
            "GET",
            "/select-table?table=%27%3B%20DROP%20TABLE%20Account%3B%20--",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_identifier");
        assert_eq!(db.acquired(), 0);
    }

    #[tokio::test]
    async fn test_select_unknown_table() {
        let (status, body) = send(&app(&FakeDatabase::new()), "GET", "/select-table?table=Coupons").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "query_failed");
        assert_eq!(body["table"], "Coupons");
    }

    #[tokio::test]
    async fn test_select_missing_parameter() {
        let (status, body) = send(&app(&FakeDatabase::new()), "GET", "/select-table").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
    }
}
