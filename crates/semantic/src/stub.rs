use async_trait::async_trait;
use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;
use crate::{Embedder, SemanticError};

const TRIGRAM_WEIGHT: f32 = 0.25;

/// Deterministic embedder used for local development, tests, and catalogs
/// without access to a model service.
///
/// Text is folded into a fixed-width vector by feature hashing: every
/// lowercase word adds `±1` to one bucket and each of its character trigrams
/// adds a smaller amount to another. Texts sharing words therefore land close
/// together under cosine similarity, which is enough to exercise ranking end
/// to end. The same text always yields the same vector.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dimension: usize,
    normalize: bool,
    model_name: String,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            normalize: true,
            model_name: "stub-hashing".into(),
        }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Synchronous core of [`Embedder::embed`]; never fails.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            self.accumulate(&mut v, word.as_bytes(), 1.0);

            let chars: Vec<char> = word.chars().collect();
            if chars.len() > 3 {
                for gram in chars.windows(3) {
                    let gram: String = gram.iter().collect();
                    self.accumulate(&mut v, gram.as_bytes(), TRIGRAM_WEIGHT);
                }
            }
        }
        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        v
    }

    fn accumulate(&self, v: &mut [f32], feature: &[u8], weight: f32) {
        let h = hash64(feature);
        let bucket = (h % self.dimension as u64) as usize;
        let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
        v[bucket] += sign * weight;
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        Ok(self.embed_sync(text))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }
}
