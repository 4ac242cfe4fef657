use serde::{Deserialize, Serialize};

use crate::SemanticError;

/// Runtime configuration describing which embedder to build and how to post-process vectors.
///
/// # Example
/// ```no_run
/// use semantic::{build_embedder, SemanticConfig};
///
/// let cfg = SemanticConfig {
///     mode: "api".into(),
///     api_url: Some("https://api-inference.huggingface.co/models/sentence-transformers/all-MiniLM-L6-v2".into()),
///     api_auth_header: Some("Bearer hf_xxx".into()),
///     api_provider: Some("hf".into()),
///     ..Default::default()
/// };
///
/// let _embedder = build_embedder(&cfg).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    /// Embedder selector: `"stub"` (deterministic hashing) or `"api"` (remote HTTP).
    pub mode: String,
    /// Model label, also sent as `model` to OpenAI-style providers.
    pub model_name: String,
    /// Expected vector width. Responses of any other width are rejected.
    pub dimension: usize,
    /// API inference endpoint when [`mode`](Self::mode) is `"api"`.
    pub api_url: Option<String>,
    /// Authorization header (e.g., `"Bearer hf_xxx"`).
    pub api_auth_header: Option<String>,
    /// Remote provider hint: `"hf"`, `"openai"`, or `"custom"` (default).
    pub api_provider: Option<String>,
    /// Overall API timeout in seconds.
    pub api_timeout_secs: u64,
    /// Normalize vectors to unit length.
    pub normalize: bool,
    /// Number of query embeddings to memoize. `0` disables the cache.
    pub cache_capacity: usize,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: "stub".into(),
            model_name: "all-MiniLM-L6-v2".into(),
            dimension: 384,
            api_url: None,
            api_auth_header: None,
            api_provider: None,
            api_timeout_secs: 30,
            normalize: true,
            cache_capacity: 1024,
        }
    }
}

impl SemanticConfig {
    pub fn validate(&self) -> Result<(), SemanticError> {
        if self.dimension == 0 {
            return Err(SemanticError::InvalidConfig(
                "dimension must be greater than zero".into(),
            ));
        }
        match self.mode.as_str() {
            "stub" => Ok(()),
            "api" => {
                if self.api_url.as_deref().is_none_or(|u| u.trim().is_empty()) {
                    return Err(SemanticError::InvalidConfig(
                        "api_url is required for api mode".into(),
                    ));
                }
                if self.api_timeout_secs == 0 {
                    return Err(SemanticError::InvalidConfig(
                        "api_timeout_secs must be greater than zero".into(),
                    ));
                }
                Ok(())
            }
            other => Err(SemanticError::InvalidConfig(format!(
                "unknown embedder mode `{other}`"
            ))),
        }
    }
}
