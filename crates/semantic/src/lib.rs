//! Catalog Semantic Embeddings
//!
//! Turns text into dense vectors comparable with the stored product
//! embeddings. Search code only sees the [`Embedder`] trait; which provider
//! sits behind it is a configuration choice:
//!
//! - **Stub mode** - deterministic feature hashing, no model needed. Handy in
//!   tests and local demos.
//! - **API mode** - calls a HuggingFace, OpenAI, or custom HTTP endpoint.
//!
//! Query vectors must come from the same model that produced the catalog's
//! stored embeddings, otherwise cosine scores are meaningless. Nothing here
//! can check that for you beyond the vector width.
//!
//! ## Quick example
//!
//! ```
//! use semantic::{build_embedder, SemanticConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cfg = SemanticConfig {
//!     dimension: 8,
//!     ..Default::default()
//! };
//! let embedder = build_embedder(&cfg).unwrap();
//! let vector = embedder.embed("solder wire").await.unwrap();
//! assert_eq!(vector.len(), 8);
//! # }
//! ```

mod api;
mod cache;
mod config;
mod error;
mod normalize;
mod stub;

use async_trait::async_trait;
use std::sync::Arc;

pub use crate::api::ApiEmbedder;
pub use crate::cache::CachedEmbedder;
pub use crate::config::SemanticConfig;
pub use crate::error::SemanticError;
pub use crate::normalize::{cosine_similarity, l2_norm, l2_normalize_in_place};
pub use crate::stub::StubEmbedder;

/// Text-to-vector provider.
///
/// Implementations must be safe to share across request handlers.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError>;

    /// Embeds several texts; the default walks them one at a time.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn model_name(&self) -> &str;

    /// Width of produced vectors, when known up front.
    fn dimension(&self) -> Option<usize> {
        None
    }
}

/// Builds the embedder described by `cfg`, wrapped in a query cache when
/// `cache_capacity > 0`.
pub fn build_embedder(cfg: &SemanticConfig) -> Result<Arc<dyn Embedder>, SemanticError> {
    cfg.validate()?;
    let base: Arc<dyn Embedder> = match cfg.mode.as_str() {
        "api" => Arc::new(ApiEmbedder::new(cfg)?),
        _ => Arc::new(StubEmbedder::new(cfg.dimension).with_normalize(cfg.normalize)),
    };
    tracing::info!(
        mode = %cfg.mode,
        model = base.model_name(),
        dimension = cfg.dimension,
        cache_capacity = cfg.cache_capacity,
        "embedder ready"
    );
    if cfg.cache_capacity == 0 {
        return Ok(base);
    }
    Ok(Arc::new(CachedEmbedder::new(base, cfg.cache_capacity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_stub_embedder_by_default() {
        let embedder = build_embedder(&SemanticConfig::default()).unwrap();
        assert_eq!(embedder.model_name(), "stub-hashing");
        assert_eq!(embedder.dimension(), Some(384));
        let a = embedder.embed("NE555 timer").await.unwrap();
        let b = embedder.embed("NE555 timer").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn default_batch_walks_each_text() {
        let embedder = StubEmbedder::new(16);
        let batch = embedder.embed_batch(&["relay", "diode"]).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], embedder.embed_sync("relay"));
        assert_eq!(batch[1], embedder.embed_sync("diode"));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let cfg = SemanticConfig {
            mode: "api".into(),
            api_url: None,
            ..Default::default()
        };
        assert!(build_embedder(&cfg).is_err());
    }

    #[test]
    fn build_api_embedder() {
        let cfg = SemanticConfig {
            mode: "api".into(),
            api_url: Some("http://127.0.0.1:9/embed".into()),
            model_name: "all-MiniLM-L6-v2".into(),
            cache_capacity: 0,
            ..Default::default()
        };
        let embedder = build_embedder(&cfg).unwrap();
        assert_eq!(embedder.model_name(), "all-MiniLM-L6-v2");
    }
}
