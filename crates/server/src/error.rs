use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog::CatalogError;
use ranking::{ErrorKind, SearchError};
use semantic::SemanticError;
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Message returned for every failure whose detail stays in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred in the search service";

/// Message returned while no product embeddings are loaded.
pub const UNAVAILABLE_MESSAGE: &str =
    "Search is disabled because no product embeddings are loaded.";

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{}", UNAVAILABLE_MESSAGE)]
    Unavailable,

    #[error("Search timed out")]
    Timeout,

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Semantic error: {0}")]
    Semantic(#[from] SemanticError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

/// Body of every error response: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unavailable | ServerError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Search(err) => match err.kind() {
                ErrorKind::Input => StatusCode::BAD_REQUEST,
                ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Catalog(_) | ServerError::Semantic(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text safe to show the caller. Internal detail is replaced by a
    /// generic message.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::Search(SearchError::Unavailable) => UNAVAILABLE_MESSAGE.to_string(),
            ServerError::Search(err) if err.kind() == ErrorKind::Input => err.to_string(),
            _ if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.public_message(),
        });

        (status, body).into_response()
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("background task failed: {err}"))
    }
}
