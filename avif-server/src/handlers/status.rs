use axum::{Json, response::IntoResponse};
use serde_json::json;

/// GET / - fixed liveness payload, no side effects.
pub async fn service_status_handler() -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "service": "avif-converter",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
