//! Embedding blob codec.
//!
//! Stored embeddings are `D` little-endian `f32` values packed back to back,
//! the same bytes numpy's `tobytes()` produces on little-endian hosts.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::CatalogError;

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Decodes a packed little-endian `f32` blob.
pub fn decode_embedding(product_id: i64, bytes: &[u8]) -> Result<Vec<f32>, CatalogError> {
    if bytes.len() % F32_BYTES != 0 {
        return Err(CatalogError::MalformedEmbedding {
            product_id,
            len: bytes.len(),
        });
    }
    Ok(bytes
        .chunks_exact(F32_BYTES)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Packs an embedding into its little-endian blob form.
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(vector.len() * F32_BYTES);
    for value in vector {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Serde adapter storing an optional blob as a base64 string (or `null`).
pub(crate) mod base64_blob {
    use super::STANDARD;
    use base64::Engine;
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = Option::<String>::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s.trim()).map_err(DeError::custom))
            .transpose()
    }
}

/// Base64 form of [`encode_embedding`], as written into catalog dumps.
pub fn encode_embedding_base64(vector: &[f32]) -> String {
    STANDARD.encode(encode_embedding(vector))
}
