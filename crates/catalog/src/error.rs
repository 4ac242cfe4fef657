use std::io;
use thiserror::Error;

/// Errors raised while loading catalog rows or building a [`CatalogSnapshot`](crate::CatalogSnapshot).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The embedding blob cannot be split into little-endian `f32` values.
    #[error("product {product_id}: embedding blob has {len} bytes, not a multiple of 4")]
    MalformedEmbedding { product_id: i64, len: usize },
    /// A product carried a zero-length embedding.
    #[error("product {product_id}: embedding is empty")]
    EmptyEmbedding { product_id: i64 },
    /// Embeddings in one snapshot must share a single dimension.
    #[error("product {product_id}: embedding dimension {got}, expected {expected}")]
    DimensionMismatch {
        product_id: i64,
        expected: usize,
        got: usize,
    },
    /// Product ids are the catalog's primary key.
    #[error("duplicate product id {0}")]
    DuplicateProduct(i64),
    #[error("catalog io error: {0}")]
    Io(#[from] io::Error),
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
