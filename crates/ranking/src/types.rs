use index::AnnError;
use semantic::SemanticError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::config::ConfigError;

/// One product under consideration for a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub product_id: i64,
    /// Row of the product inside the snapshot / vector index.
    pub row: usize,
    pub category_id: Option<i64>,
    /// Exact cosine similarity between the query and the stored embedding.
    pub semantic_score: f32,
    /// Keyword bonus, never negative.
    pub boost: f32,
    /// `semantic_score + boost`.
    pub final_score: f32,
}

impl ScoredCandidate {
    pub fn new(product_id: i64, row: usize, category_id: Option<i64>, semantic_score: f32) -> Self {
        Self {
            product_id,
            row,
            category_id,
            semantic_score,
            boost: 0.0,
            final_score: semantic_score,
        }
    }

    pub(crate) fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
        self.final_score = self.semantic_score + boost;
    }
}

/// Search request as received from a client.
///
/// `category_id` is kept as raw JSON because a present-but-unparseable value
/// silently means "no filter" rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub q: String,
    #[serde(default)]
    pub category_id: Option<JsonValue>,
    #[serde(default = "SearchRequest::default_page")]
    pub page: usize,
    #[serde(default = "SearchRequest::default_limit")]
    pub limit: usize,
}

impl SearchRequest {
    pub(crate) fn default_page() -> usize {
        1
    }

    pub(crate) fn default_limit() -> usize {
        10
    }

    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            category_id: None,
            page: Self::default_page(),
            limit: Self::default_limit(),
        }
    }

    pub fn with_category(mut self, category_id: JsonValue) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_page(mut self, page: usize, limit: usize) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }
}

/// One page of ranked product ids plus the size of the full ordered list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub product_ids: Vec<i64>,
    pub total: usize,
}

/// Coarse classification used to pick a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller sent a bad request.
    Input,
    /// No index is loaded; search cannot run at all.
    Unavailable,
    /// Anything else.
    Internal,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid `{field}`: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },
    #[error("search index is not loaded")]
    Unavailable,
    #[error("query embedding failed: {0}")]
    Embedding(#[from] SemanticError),
    #[error("vector index error: {0}")]
    Index(#[from] AnnError),
    #[error("vector index returned row {0} unknown to the catalog snapshot")]
    UnknownRow(i64),
    #[error("query vector has dimension {got}, catalog uses {expected}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("invalid ranking configuration: {0}")]
    Config(#[from] ConfigError),
}

impl SearchError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::Input,
            Self::Unavailable => ErrorKind::Unavailable,
            _ => ErrorKind::Internal,
        }
    }
}
