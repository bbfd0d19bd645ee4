use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::handlers::AppState;

/// Handle `/` with a welcome payload
pub async fn welcome() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the Pricing API" }))
}

/// Health check endpoint
/// Returns 200 OK with a summary of the loaded dataset
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "gce-pricing",
            "version": env!("CARGO_PKG_VERSION"),
            "tables": state.catalog.tables().len(),
            "machine_rows": state.catalog.machine_row_count(),
        })),
    )
}
