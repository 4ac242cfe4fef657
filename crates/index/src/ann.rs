//! Approximate Nearest Neighbor (ANN) search using HNSW algorithm.
//!
//! [`AnnIndex`] stores catalog embeddings in row order and answers top-K
//! queries by Euclidean (L2) distance. Large catalogs go through a
//! Hierarchical Navigable Small World graph; small catalogs, unbuilt indexes
//! and requests for at least as many neighbours as there are rows fall back
//! to an exact linear scan.
//!
//! ## Trade-offs
//!
//! - **Speed**: ~100-1000x faster than linear scan for large datasets
//! - **Recall**: Typically 95-99% (some false negatives possible)
//! - **Memory**: Higher memory usage than linear scan
//!
//! The distance reported here is only used to pick a candidate set; callers
//! rescore candidates with their own similarity.

use hnsw_rs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{SearchHits, VectorIndex};

/// Configuration for ANN index construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnConfig {
    /// Number of neighbors per node (higher = better recall, slower build).
    /// Default: 16
    pub m: usize,
    /// Size of dynamic candidate list during construction (higher = better recall, slower build).
    /// Default: 200
    pub ef_construction: usize,
    /// Size of dynamic candidate list during search. Raised to `k` when a
    /// query asks for more neighbours.
    /// Default: 64
    pub ef_search: usize,
    /// Whether to use ANN or fall back to linear scan.
    /// Default: true (use ANN when beneficial)
    pub enabled: bool,
    /// Minimum number of vectors before ANN is used.
    /// Below this threshold, linear scan is used even if enabled=true.
    /// Default: 1000
    pub min_vectors_for_ann: usize,
}

impl Default for AnnConfig {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 64,
            enabled: true,
            min_vectors_for_ann: 1000,
        }
    }
}

impl AnnConfig {
    pub fn with_m(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    pub fn with_ef_construction(mut self, ef: usize) -> Self {
        self.ef_construction = ef;
        self
    }

    pub fn with_ef_search(mut self, ef: usize) -> Self {
        self.ef_search = ef;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_min_vectors_for_ann(mut self, min: usize) -> Self {
        self.min_vectors_for_ann = min;
        self
    }

    /// Check if ANN should be used given the current dataset size.
    pub fn should_use_ann(&self, num_vectors: usize) -> bool {
        self.enabled && num_vectors >= self.min_vectors_for_ann
    }
}

/// Vector index over catalog rows (HNSW implementation).
pub struct AnnIndex {
    config: AnnConfig,
    dimension: usize,
    hnsw: Option<Hnsw<'static, f32, DistL2>>,
    vectors: Vec<Vec<f32>>,
    built: bool,
}

impl AnnIndex {
    /// Create a new empty ANN index.
    pub fn new(dimension: usize, config: AnnConfig) -> Self {
        Self {
            config,
            dimension,
            hnsw: None,
            vectors: Vec::new(),
            built: false,
        }
    }

    /// Append a vector; its row number is the number of vectors inserted before it.
    pub fn insert(&mut self, vector: Vec<f32>) -> Result<usize, AnnError> {
        if vector.len() != self.dimension {
            return Err(AnnError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }

        let row = self.vectors.len();
        self.vectors.push(vector);

        // Mark as needing rebuild
        self.built = false;

        Ok(row)
    }

    /// HNSW-based approximate search.
    fn hnsw_search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, AnnError> {
        let hnsw = self.hnsw.as_ref().ok_or(AnnError::NotBuilt)?;
        let ef = self.config.ef_search.max(k);
        let neighbours: Vec<Neighbour> = hnsw.search(query, k, ef);

        Ok(neighbours
            .into_iter()
            .map(|neighbour| (neighbour.get_origin_id(), neighbour.distance))
            .collect())
    }

    /// Linear search (exact, slow but accurate).
    fn linear_search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut distances: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(row, vec)| (row, l2_distance(query, vec)))
            .collect();

        // Stable sort keeps lower rows first on equal distance.
        distances.sort_by(|a, b| a.1.total_cmp(&b.1));
        distances.truncate(k);
        distances
    }

    /// Number of vectors in index.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Check if HNSW index is built.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Build HNSW index (required before using ANN search).
    /// Only builds the graph if there are enough vectors for HNSW to work properly (minimum 10).
    pub fn build(&mut self) {
        if self.vectors.is_empty() {
            return;
        }

        let nb_elem = self.vectors.len();
        if nb_elem < 10 || !self.config.should_use_ann(nb_elem) {
            // Linear scan only
            self.hnsw = None;
            self.built = true;
            return;
        }

        let nb_layer = 16.min((nb_elem as f32).ln().trunc() as usize).max(1);
        let hnsw = Hnsw::<f32, DistL2>::new(
            self.config.m,
            nb_elem,
            nb_layer,
            self.config.ef_construction,
            DistL2 {},
        );

        // Data ids are the row numbers, so `get_origin_id` maps straight back.
        let data_for_insertion: Vec<(&Vec<f32>, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(row, vec)| (vec, row))
            .collect();
        hnsw.parallel_insert(&data_for_insertion);

        log::info!(
            "built HNSW graph over {nb_elem} vectors (m={}, layers={nb_layer})",
            self.config.m
        );

        self.hnsw = Some(hnsw);
        self.built = true;
    }

    /// Rebuild the index (useful after batch insertions).
    pub fn rebuild(&mut self) {
        self.built = false;
        self.build();
    }

    /// Get current configuration.
    pub fn config(&self) -> &AnnConfig {
        &self.config
    }

    /// Build an index over `vectors` in the given order.
    pub fn from_vectors<I>(dimension: usize, config: AnnConfig, vectors: I) -> Result<Self, AnnError>
    where
        I: IntoIterator<Item = Vec<f32>>,
    {
        let mut index = Self::new(dimension, config);
        for vector in vectors {
            index.insert(vector)?;
        }
        index.build();
        Ok(index)
    }
}

impl VectorIndex for AnnIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<SearchHits, AnnError> {
        if query.len() != self.dimension {
            return Err(AnnError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }
        if k == 0 {
            return Ok(SearchHits::default());
        }

        let use_graph = self.built
            && self.hnsw.is_some()
            && self.config.should_use_ann(self.vectors.len())
            && k < self.vectors.len();

        let neighbours = if use_graph {
            self.hnsw_search(query, k)?
        } else {
            self.linear_search(query, k)
        };

        Ok(SearchHits::padded(neighbours, k))
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Error type for ANN operations.
#[derive(Debug, thiserror::Error)]
pub enum AnnError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("Index not built")]
    NotBuilt,
}

/// Euclidean distance.
fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
