use thiserror::Error;

/// Errors surfaced by [`Embedder`](crate::Embedder) implementations.
#[derive(Debug, Clone, Error)]
pub enum SemanticError {
    /// Configuration is inconsistent (e.g., `api` mode without an `api_url`).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// The embedding service could not be reached or answered with a non-2xx status.
    #[error("embedding request failed: {0}")]
    Request(String),
    /// The service answered, but not with a usable vector.
    #[error("inference failure: {0}")]
    Inference(String),
    /// The provider returned a vector of the wrong width.
    #[error("embedding dimension {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_config() {
        let err = SemanticError::InvalidConfig("api_url is required".into());
        assert!(err.to_string().contains("invalid semantic config"));
        assert!(err.to_string().contains("api_url is required"));
    }

    #[test]
    fn error_request() {
        let err = SemanticError::Request("connection refused".into());
        assert!(err.to_string().contains("embedding request failed"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn error_dimension_mismatch() {
        let err = SemanticError::DimensionMismatch {
            expected: 384,
            got: 768,
        };
        assert_eq!(err.to_string(), "embedding dimension 768, expected 384");
    }

    #[test]
    fn error_clone_preserves_message() {
        let err = SemanticError::Inference("empty vector".into());
        assert_eq!(err.to_string(), err.clone().to_string());
    }
}
