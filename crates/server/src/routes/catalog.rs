use crate::state::ServerState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category_id: i64,
    pub category_name: String,
    /// Searchable (embedded) products in this category.
    pub product_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategorySummary>,
}

/// Every known category of the live snapshot in ascending id order.
pub async fn list_categories(State(state): State<Arc<ServerState>>) -> Json<CategoriesResponse> {
    let engine = state.engine();
    let snapshot = engine.snapshot();
    let counts = snapshot.category_counts();

    let categories = snapshot
        .categories()
        .map(|(category_id, name)| CategorySummary {
            category_id,
            category_name: name.to_string(),
            product_count: counts.get(&category_id).copied().unwrap_or(0),
        })
        .collect();

    Json(CategoriesResponse { categories })
}
