//! `POST /search`.
//!
//! The body is read as loose JSON so that every malformed field gets a 400
//! naming it, and so that availability is reported before anything about the
//! request is judged.

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use ranking::{SearchPage, SearchRequest};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Raw request body. Every field is optional at this layer.
#[derive(Debug, Default, Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub q: Option<Value>,
    #[serde(default)]
    pub category_id: Option<Value>,
    #[serde(default)]
    pub page: Option<Value>,
    #[serde(default)]
    pub limit: Option<Value>,
}

impl SearchBody {
    /// Validates `q`, `page` and `limit`. `category_id` passes through
    /// untouched; an unusable value later means "no filter".
    pub fn into_request(self) -> ServerResult<SearchRequest> {
        let q = match self.q {
            Some(Value::String(q)) if !q.trim().is_empty() => q,
            Some(Value::String(_)) | Some(Value::Null) | None => {
                return Err(ServerError::BadRequest("Query 'q' is required".into()))
            }
            Some(_) => return Err(ServerError::BadRequest("Query 'q' must be a string".into())),
        };
        let page = positive_int("page", self.page, 1)?;
        let limit = positive_int("limit", self.limit, 10)?;

        let mut request = SearchRequest::new(q).with_page(page, limit);
        request.category_id = self.category_id.filter(|v| !v.is_null());
        Ok(request)
    }
}

/// Integer or numeric string, at least 1; absent or null gives `default`.
fn positive_int(field: &str, value: Option<Value>, default: usize) -> ServerResult<usize> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(n) if n >= 1 => usize::try_from(n)
            .map_err(|_| ServerError::BadRequest(format!("'{field}' is too large"))),
        Some(_) => Err(ServerError::BadRequest(format!(
            "'{field}' must be at least 1"
        ))),
        None => Err(ServerError::BadRequest(format!(
            "'{field}' must be an integer"
        ))),
    }
}

/// Rank the catalog for a query and return one page of product ids.
pub async fn search(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> ServerResult<Json<SearchPage>> {
    let start = Instant::now();
    let result = run_search(&state, body).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) => match err.status_code().as_u16() {
            400 => "invalid",
            503 => "unavailable",
            _ => "error",
        },
    };
    metrics::counter!("catalog_search_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("catalog_search_latency_seconds").record(start.elapsed().as_secs_f64());

    result.map(Json)
}

async fn run_search(
    state: &ServerState,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> ServerResult<SearchPage> {
    let engine = state.engine();
    if !engine.is_available() {
        return Err(ServerError::Unavailable);
    }

    let Json(body) = body.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
    let request = body.into_request()?;
    tracing::info!(query = %request.q, "Received search query");

    let page = tokio::time::timeout(state.config.search_timeout(), engine.search(&request))
        .await
        .map_err(|_| {
            tracing::warn!(query = %request.q, "search timed out");
            ServerError::Timeout
        })??;

    tracing::info!(
        query = %request.q,
        returned = page.product_ids.len(),
        total = page.total,
        "Sending search results"
    );
    Ok(page)
}
