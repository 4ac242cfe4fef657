//! Product embedding generation.
//!
//! Used at load time when `catalog.embed_missing` is set, and by the
//! `embed-catalog` binary to regenerate a whole dump.

use catalog::{embedding_text, encode_embedding, CatalogDump};
use semantic::{Embedder, SemanticError};

/// Default number of texts sent to the embedder per call.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Which products get a fresh embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedScope {
    /// Only products without a stored embedding.
    Missing,
    /// Every product; existing embeddings are replaced.
    All,
}

/// Embeds products of `dump` in place and returns how many were written.
///
/// The text for each product is [`embedding_text`] with its category name.
pub async fn embed_products(
    dump: &mut CatalogDump,
    embedder: &dyn Embedder,
    scope: EmbedScope,
    batch_size: usize,
) -> Result<usize, SemanticError> {
    let pending: Vec<(usize, String)> = dump
        .products
        .iter()
        .enumerate()
        .filter(|(_, p)| scope == EmbedScope::All || p.product_embedding.is_none())
        .map(|(i, p)| (i, embedding_text(p, dump.category_name(p.category_id))))
        .collect();

    if pending.is_empty() {
        return Ok(0);
    }

    for chunk in pending.chunks(batch_size.max(1)) {
        let texts: Vec<&str> = chunk.iter().map(|(_, text)| text.as_str()).collect();
        let vectors = embedder.embed_batch(&texts).await?;
        if vectors.len() != chunk.len() {
            return Err(SemanticError::Inference(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                chunk.len()
            )));
        }
        for ((position, _), vector) in chunk.iter().zip(vectors) {
            dump.products[*position].product_embedding = Some(encode_embedding(&vector));
        }
        tracing::debug!(batch = chunk.len(), "embedded product batch");
    }

    tracing::info!(
        products = pending.len(),
        model = embedder.model_name(),
        "product embeddings generated"
    );
    Ok(pending.len())
}
