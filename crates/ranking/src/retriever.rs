use catalog::CatalogSnapshot;
use index::VectorIndex;
use semantic::cosine_similarity;

use crate::types::{ScoredCandidate, SearchError};

/// Pulls the top-K neighbours out of the vector index and rescores them.
///
/// The index's own metric only picks the candidate set. Every candidate is
/// then scored by exact cosine similarity against its stored embedding so
/// ranking uses one similarity definition regardless of index type.
pub struct CandidateRetriever<'a> {
    snapshot: &'a CatalogSnapshot,
    index: &'a dyn VectorIndex,
    k: usize,
}

impl<'a> CandidateRetriever<'a> {
    pub fn new(snapshot: &'a CatalogSnapshot, index: &'a dyn VectorIndex, k: usize) -> Self {
        Self { snapshot, index, k }
    }

    /// Candidates sorted by descending semantic score.
    pub fn retrieve(&self, query: &[f32]) -> Result<Vec<ScoredCandidate>, SearchError> {
        if self.index.is_empty() {
            return Err(SearchError::Unavailable);
        }
        if query.len() != self.snapshot.dimension() {
            return Err(SearchError::DimensionMismatch {
                expected: self.snapshot.dimension(),
                got: query.len(),
            });
        }

        let hits = self.index.search(query, self.k)?;
        let mut candidates = Vec::with_capacity(hits.ids.len());
        for &id in hits.ids.iter().filter(|&&id| id != index::NO_MATCH) {
            let record = usize::try_from(id)
                .ok()
                .and_then(|row| self.snapshot.by_row(row))
                .ok_or(SearchError::UnknownRow(id))?;
            candidates.push(ScoredCandidate::new(
                record.id,
                record.row,
                record.category_id,
                cosine_similarity(query, &record.embedding),
            ));
        }

        candidates.sort_by(|a, b| b.semantic_score.total_cmp(&a.semantic_score));
        tracing::debug!(
            requested = self.k,
            retrieved = candidates.len(),
            "candidates retrieved"
        );
        Ok(candidates)
    }
}
