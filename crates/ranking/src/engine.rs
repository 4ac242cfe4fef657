use catalog::CatalogSnapshot;
use index::{AnnIndex, VectorIndex};
use semantic::Embedder;
use std::sync::Arc;

use crate::config::RankingConfig;
use crate::diversify::ProjectDiversifier;
use crate::filter::CategorySelector;
use crate::keyword::KeywordBooster;
use crate::paginate::Pagination;
use crate::retriever::CandidateRetriever;
use crate::types::{ScoredCandidate, SearchError, SearchPage, SearchRequest};

#[cfg(test)]
mod tests;

/// Immutable search service: one catalog snapshot, the index built over it,
/// the query embedder and the ranking configuration.
///
/// Nothing inside changes after construction. A catalog reload builds a new
/// engine and swaps it in wholesale, so concurrent requests need no locking.
pub struct SearchEngine {
    snapshot: Arc<CatalogSnapshot>,
    index: Option<Arc<dyn VectorIndex>>,
    embedder: Arc<dyn Embedder>,
    booster: KeywordBooster,
    config: RankingConfig,
}

impl SearchEngine {
    /// Builds the vector index over `snapshot` (rows in record order).
    ///
    /// An empty snapshot yields an engine that answers every search with
    /// [`SearchError::Unavailable`].
    pub fn new(
        snapshot: Arc<CatalogSnapshot>,
        embedder: Arc<dyn Embedder>,
        config: RankingConfig,
    ) -> Result<Self, SearchError> {
        let index: Option<Arc<dyn VectorIndex>> = if snapshot.is_empty() {
            tracing::warn!("no product embeddings loaded; search is disabled");
            None
        } else {
            let index = AnnIndex::from_vectors(
                snapshot.dimension(),
                config.ann,
                snapshot.records().iter().map(|r| r.embedding.clone()),
            )?;
            tracing::info!(
                rows = index.len(),
                dimension = index.dimension(),
                graph = index.is_built(),
                "vector index built"
            );
            Some(Arc::new(index))
        };
        Self::with_index(snapshot, index, embedder, config)
    }

    /// Uses a caller-supplied index whose row `i` must hold
    /// `snapshot.records()[i]`.
    pub fn with_index(
        snapshot: Arc<CatalogSnapshot>,
        index: Option<Arc<dyn VectorIndex>>,
        embedder: Arc<dyn Embedder>,
        config: RankingConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        if let Some(expected) = embedder.dimension() {
            let dim = snapshot.dimension();
            if dim != 0 && dim != expected {
                tracing::warn!(
                    embedder = embedder.model_name(),
                    embedder_dimension = expected,
                    catalog_dimension = dim,
                    "embedder and catalog dimensions differ; searches will fail"
                );
            }
        }
        let booster = KeywordBooster::new(&config.boost);
        Ok(Self {
            snapshot,
            index,
            embedder,
            booster,
            config,
        })
    }

    pub fn snapshot(&self) -> &Arc<CatalogSnapshot> {
        &self.snapshot
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// `false` while no index is loaded or the index is empty.
    pub fn is_available(&self) -> bool {
        self.index.as_ref().is_some_and(|index| !index.is_empty())
    }

    /// Full request pipeline: validate, embed, rank, paginate.
    pub async fn search(&self, req: &SearchRequest) -> Result<SearchPage, SearchError> {
        if !self.is_available() {
            return Err(SearchError::Unavailable);
        }
        if req.q.trim().is_empty() {
            return Err(SearchError::invalid("q", "query text is required"));
        }
        let pagination = Pagination::new(req.page, req.limit)?;
        let selector = CategorySelector::from_request(req.category_id.as_ref());

        let query_vector = self.embedder.embed(&req.q).await?;
        let ranked = self.rank(&query_vector, &req.q, selector)?;

        let (page, total) = pagination.slice(&ranked);
        Ok(SearchPage {
            product_ids: page.iter().map(|c| c.product_id).collect(),
            total,
        })
    }

    /// Ranks the catalog for an already-embedded query.
    ///
    /// Returns the complete ordered list; pagination is left to the caller.
    pub fn rank(
        &self,
        query_vector: &[f32],
        query: &str,
        selector: CategorySelector,
    ) -> Result<Vec<ScoredCandidate>, SearchError> {
        let index = self.index.as_deref().ok_or(SearchError::Unavailable)?;

        let retriever = CandidateRetriever::new(&self.snapshot, index, self.config.retrieval_k);
        let mut candidates = retriever.retrieve(query_vector)?;
        self.booster.apply(query, &mut candidates, &self.snapshot)?;

        let diversify = !selector.is_active() && self.config.diversify.is_project_query(query);
        let ranked = if selector.is_active() {
            selector.apply(candidates)
        } else if diversify {
            ProjectDiversifier::from_config(&self.config.diversify).diversify(candidates)
        } else {
            candidates
        };

        tracing::info!(
            query,
            category = ?selector,
            diversified = diversify,
            results = ranked.len(),
            "search ranked"
        );
        Ok(ranked)
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("products", &self.snapshot.len())
            .field("available", &self.is_available())
            .field("embedder", &self.embedder.model_name())
            .finish()
    }
}
