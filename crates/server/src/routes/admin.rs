use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub status: String,
    pub products: usize,
    pub skipped: usize,
    pub search_available: bool,
}

/// Rebuild snapshot and index from the catalog source and publish them.
pub async fn reload_catalog(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<Json<ReloadResponse>> {
    let engine = state.reload().await?;
    Ok(Json(ReloadResponse {
        status: "reloaded".to_string(),
        products: engine.snapshot().len(),
        skipped: engine.snapshot().skipped(),
        search_available: engine.is_available(),
    }))
}
