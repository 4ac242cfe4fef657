//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `health`: liveness, readiness and metrics
//! - `search`: ranked product search
//! - `catalog`: category listing over the live snapshot
//! - `admin`: catalog reload

pub mod admin;
pub mod catalog;
pub mod health;
pub mod search;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Service name and available endpoints (GET /).
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Catalog Search",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "POST /search",
            "GET /categories",
            "POST /admin/reload",
            "/metadata",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
