//! # Catalog Index
//!
//! Nearest-neighbour lookup over catalog embeddings.
//!
//! The [`VectorIndex`] trait is the seam search code programs against: give
//! it a query vector and a width `K`, get back `K` `(row, distance)` slots.
//! When fewer than `K` rows exist the tail slots hold the [`NO_MATCH`]
//! sentinel, the same contract FAISS-style indexes use, and callers must
//! drop them. [`AnnIndex`] is the bundled implementation: HNSW over L2
//! distance with an exact linear scan for small catalogs.
//!
//! ## Example Usage
//!
//! ```
//! use index::{AnnConfig, AnnIndex, VectorIndex, NO_MATCH};
//!
//! let index = AnnIndex::from_vectors(
//!     2,
//!     AnnConfig::default(),
//!     vec![vec![1.0, 0.0], vec![0.0, 1.0]],
//! )
//! .unwrap();
//!
//! let hits = index.search(&[1.0, 0.1], 3).unwrap();
//! assert_eq!(hits.ids, vec![0, 1, NO_MATCH]);
//! ```

pub mod ann;

pub use crate::ann::{AnnConfig, AnnError, AnnIndex};

/// Row id reported for an empty result slot.
pub const NO_MATCH: i64 = -1;

/// Parallel `ids` / `distances` arrays returned by [`VectorIndex::search`].
///
/// Both arrays always have the requested length; unused slots carry
/// [`NO_MATCH`] and `f32::INFINITY`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub ids: Vec<i64>,
    pub distances: Vec<f32>,
}

impl SearchHits {
    /// Pads `neighbours` with sentinel slots up to `k` entries.
    pub fn padded(neighbours: Vec<(usize, f32)>, k: usize) -> Self {
        let mut ids = Vec::with_capacity(k);
        let mut distances = Vec::with_capacity(k);
        for (row, distance) in neighbours.into_iter().take(k) {
            ids.push(row as i64);
            distances.push(distance);
        }
        while ids.len() < k {
            ids.push(NO_MATCH);
            distances.push(f32::INFINITY);
        }
        Self { ids, distances }
    }

    /// Occupied slots as `(row, distance)`, in index order, sentinels removed.
    pub fn rows(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.ids
            .iter()
            .zip(self.distances.iter())
            .filter(|(id, _)| **id != NO_MATCH)
            .filter_map(|(id, distance)| usize::try_from(*id).ok().map(|row| (row, *distance)))
    }
}

/// Top-K similarity search over rows of a catalog.
pub trait VectorIndex: Send + Sync {
    /// Returns `k` slots ordered from nearest to farthest by the index's own metric.
    fn search(&self, query: &[f32], k: usize) -> Result<SearchHits, AnnError>;

    /// Number of rows stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimension accepted by [`search`](Self::search).
    fn dimension(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_fills_missing_slots() {
        let hits = SearchHits::padded(vec![(3, 0.5)], 3);
        assert_eq!(hits.ids, vec![3, NO_MATCH, NO_MATCH]);
        assert_eq!(hits.distances[0], 0.5);
        assert!(hits.distances[1].is_infinite());
    }

    #[test]
    fn padded_truncates_to_k() {
        let hits = SearchHits::padded(vec![(0, 0.1), (1, 0.2), (2, 0.3)], 2);
        assert_eq!(hits.ids, vec![0, 1]);
    }

    #[test]
    fn rows_skips_sentinels() {
        let hits = SearchHits {
            ids: vec![4, NO_MATCH, 1, NO_MATCH],
            distances: vec![0.1, f32::INFINITY, 0.4, f32::INFINITY],
        };
        let rows: Vec<_> = hits.rows().collect();
        assert_eq!(rows, vec![(4, 0.1), (1, 0.4)]);
    }
}
