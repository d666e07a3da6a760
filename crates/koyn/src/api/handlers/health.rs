//! Health check.

use axum::Json;
use serde_json::{Value, json};

/// Liveness probe. Public by policy.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
