//! Workspace umbrella crate for catalog search.
//!
//! Re-exports the building blocks (catalog snapshot, vector index, query
//! embedders and the ranking pipeline) and adds a single entry point that
//! turns a catalog source into a ready [`SearchEngine`].
//!
//! ```
//! use std::sync::Arc;
//! use catalog_search::{
//!     engine_from_dump, CatalogDump, ProductRow, RankingConfig, SearchRequest, StubEmbedder,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let embedder = StubEmbedder::new(128);
//! let dump = CatalogDump {
//!     categories: Vec::new(),
//!     products: vec![
//!         ProductRow::new(7, "Relay Module").with_embedding(&embedder.embed_sync("Relay Module")),
//!     ],
//! };
//!
//! let engine = engine_from_dump(dump, Arc::new(embedder), RankingConfig::default()).unwrap();
//! let page = engine.search(&SearchRequest::new("relay")).await.unwrap();
//! assert_eq!(page.product_ids, vec![7]);
//! # }
//! ```

pub use catalog::{
    CatalogDump, CatalogError, CatalogSnapshot, CatalogSource, CategoryRow, JsonCatalogSource,
    ProductRecord, ProductRow, decode_embedding, embedding_text, encode_embedding,
};
pub use index::{AnnConfig, AnnError, AnnIndex, NO_MATCH, SearchHits, VectorIndex};
pub use ranking::{
    BoostConfig, CandidateRetriever, CategorySelector, CategoryTier, DiversifyConfig, ErrorKind,
    KeywordBooster, Pagination, ProjectDiversifier, RankingConfig, ScoredCandidate, SearchEngine,
    SearchError, SearchPage, SearchRequest,
};
pub use semantic::{
    ApiEmbedder, CachedEmbedder, Embedder, SemanticConfig, SemanticError, StubEmbedder,
    build_embedder,
};

#[cfg(feature = "server")]
pub use server;

use std::sync::Arc;

/// Errors that can occur while assembling a search engine from a catalog.
#[derive(Debug, thiserror::Error)]
pub enum EngineBuildError {
    #[error("catalog failure: {0}")]
    Catalog(#[from] CatalogError),
    #[error("engine construction failed: {0}")]
    Search(#[from] SearchError),
}

/// Build a [`SearchEngine`] over an in-memory dump.
///
/// Products without an embedding are left out of the snapshot.
pub fn engine_from_dump(
    dump: CatalogDump,
    embedder: Arc<dyn Embedder>,
    config: RankingConfig,
) -> Result<SearchEngine, EngineBuildError> {
    let snapshot = CatalogSnapshot::from_dump(dump)?;
    tracing::debug!(
        products = snapshot.len(),
        skipped = snapshot.skipped(),
        "catalog snapshot built"
    );
    Ok(SearchEngine::new(Arc::new(snapshot), embedder, config)?)
}

/// Load `source` and build a [`SearchEngine`] over it.
pub fn load_engine(
    source: &dyn CatalogSource,
    embedder: Arc<dyn Embedder>,
    config: RankingConfig,
) -> Result<SearchEngine, EngineBuildError> {
    engine_from_dump(source.load()?, embedder, config)
}
