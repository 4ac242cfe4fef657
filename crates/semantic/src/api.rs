use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::normalize::l2_normalize_in_place;
use crate::{Embedder, SemanticConfig, SemanticError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiProviderKind {
    HuggingFace,
    OpenAI,
    Custom,
}

impl ApiProviderKind {
    fn from_hint(hint: Option<&str>) -> Self {
        match hint.unwrap_or("custom").to_ascii_lowercase().as_str() {
            "hf" | "huggingface" => Self::HuggingFace,
            "openai" | "gpt" => Self::OpenAI,
            _ => Self::Custom,
        }
    }
}

/// Embedder backed by a remote HTTP inference endpoint.
///
/// Supports HuggingFace feature-extraction, OpenAI `/embeddings`, and a plain
/// `{"text": ...}` → `{"embedding": [...]}` custom shape. A failed request is
/// reported as-is; there are no retries on the search path.
#[derive(Debug, Clone)]
pub struct ApiEmbedder {
    client: reqwest::Client,
    url: String,
    auth_header: Option<String>,
    provider: ApiProviderKind,
    model_name: String,
    dimension: usize,
    normalize: bool,
}

impl ApiEmbedder {
    pub fn new(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        cfg.validate()?;
        let url = cfg
            .api_url
            .clone()
            .ok_or_else(|| SemanticError::InvalidConfig("api_url is required for api mode".into()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.api_timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.api_timeout_secs.min(10)))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| SemanticError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url,
            auth_header: cfg.api_auth_header.clone(),
            provider: ApiProviderKind::from_hint(cfg.api_provider.as_deref()),
            model_name: cfg.model_name.clone(),
            dimension: cfg.dimension,
            normalize: cfg.normalize,
        })
    }

    async fn send(&self, payload: Value) -> Result<Value, SemanticError> {
        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json");
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header("Authorization", header);
        }

        let response = request
            .json(&payload)
            .send()
            .await
            .map_err(|e| SemanticError::Request(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SemanticError::Request(format!("HTTP error {status}: {body}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SemanticError::Inference(format!("invalid JSON response: {e}")))
    }

    fn finish(&self, mut vector: Vec<f32>) -> Result<Vec<f32>, SemanticError> {
        if vector.len() != self.dimension {
            return Err(SemanticError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }
        if self.normalize {
            l2_normalize_in_place(&mut vector);
        }
        Ok(vector)
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let payload = build_api_payload(self.provider, &[text], &self.model_name, false);
        let response = self.send(payload).await?;
        let vector = parse_embeddings_from_value(response)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                SemanticError::Inference("API response did not contain embeddings".into())
            })?;
        tracing::debug!(provider = ?self.provider, dim = vector.len(), "query embedded");
        self.finish(vector)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let payload = build_api_payload(self.provider, texts, &self.model_name, true);
        let response = self.send(payload).await?;
        let vectors = parse_embeddings_from_value(response)?;
        if vectors.len() != texts.len() {
            return Err(SemanticError::Inference(format!(
                "API returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        vectors.into_iter().map(|v| self.finish(v)).collect()
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }
}

fn build_api_payload(provider: ApiProviderKind, texts: &[&str], model: &str, batch: bool) -> Value {
    let first = texts.first().copied().unwrap_or("");
    match provider {
        ApiProviderKind::HuggingFace => {
            if batch {
                json!({ "inputs": texts })
            } else {
                json!({ "inputs": first })
            }
        }
        ApiProviderKind::OpenAI => {
            if batch {
                json!({ "input": texts, "model": model })
            } else {
                json!({ "input": first, "model": model })
            }
        }
        ApiProviderKind::Custom => {
            if batch {
                json!({ "texts": texts })
            } else {
                json!({ "text": first })
            }
        }
    }
}

fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embedding) = map.remove("embedding") {
                return parse_embedding_vector(embedding).map(|v| vec![v]);
            }
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }

            if let Some(Value::Array(items)) = map.remove("data") {
                let mut vectors = Vec::with_capacity(items.len());
                for item in items {
                    let Value::Object(mut obj) = item else {
                        return Err(SemanticError::Inference(
                            "unexpected entry inside `data` array".into(),
                        ));
                    };
                    let embedding = obj.remove("embedding").ok_or_else(|| {
                        SemanticError::Inference("missing `embedding` field in data item".into())
                    })?;
                    vectors.push(parse_embedding_vector(embedding)?);
                }
                return Ok(vectors);
            }

            Err(SemanticError::Inference(
                "unsupported API response shape".into(),
            ))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                Ok(Vec::new())
            } else if items.iter().all(|item| matches!(item, Value::Array(_))) {
                items.into_iter().map(parse_embedding_vector).collect()
            } else {
                parse_embedding_vector(Value::Array(items)).map(|vec| vec![vec])
            }
        }
        other => parse_embedding_vector(other).map(|vec| vec![vec]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, SemanticError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| SemanticError::Inference("non-finite embedding value".into())),
                other => Err(SemanticError::Inference(format!(
                    "embedding entries must be numbers, got {other:?}"
                ))),
            })
            .collect(),
        other => Err(SemanticError::Inference(format!(
            "embedding vector must be an array, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_config(provider: &str) -> SemanticConfig {
        SemanticConfig {
            mode: "api".into(),
            api_url: Some("http://127.0.0.1:9/embed".into()),
            api_provider: Some(provider.into()),
            dimension: 3,
            ..SemanticConfig::default()
        }
    }

    #[test]
    fn provider_hint_parsing() {
        assert_eq!(ApiProviderKind::from_hint(Some("HF")), ApiProviderKind::HuggingFace);
        assert_eq!(ApiProviderKind::from_hint(Some("openai")), ApiProviderKind::OpenAI);
        assert_eq!(ApiProviderKind::from_hint(None), ApiProviderKind::Custom);
    }

    #[test]
    fn payload_shapes_per_provider() {
        let hf = build_api_payload(ApiProviderKind::HuggingFace, &["relay"], "m", false);
        assert_eq!(hf, json!({ "inputs": "relay" }));

        let openai = build_api_payload(ApiProviderKind::OpenAI, &["a", "b"], "m", true);
        assert_eq!(openai, json!({ "input": ["a", "b"], "model": "m" }));

        let custom = build_api_payload(ApiProviderKind::Custom, &["relay"], "m", false);
        assert_eq!(custom, json!({ "text": "relay" }));
    }

    #[test]
    fn parses_openai_data_shape() {
        let value = json!({ "data": [{ "embedding": [0.1, 0.2] }, { "embedding": [0.3, 0.4] }] });
        let vectors = parse_embeddings_from_value(value).unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1], vec![0.3, 0.4]);
    }

    #[test]
    fn parses_single_embedding_field() {
        let vectors = parse_embeddings_from_value(json!({ "embedding": [1.0, 2.0] })).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 2.0]]);
    }

    #[test]
    fn parse_embedding_collection_various_formats() {
        let nested = parse_embedding_collection(json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])).unwrap();
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0], vec![1.0, 2.0, 3.0]);

        let flat = parse_embedding_collection(json!([1.0, 2.0, 3.0])).unwrap();
        assert_eq!(flat, vec![vec![1.0, 2.0, 3.0]]);

        assert!(parse_embedding_collection(json!([])).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_numeric_entries() {
        let err = parse_embeddings_from_value(json!([["a", "b"]])).unwrap_err();
        assert!(err.to_string().contains("must be numbers"));
    }

    #[test]
    fn rejects_unknown_object_shape() {
        let err = parse_embeddings_from_value(json!({ "vectors": [] })).unwrap_err();
        assert!(err.to_string().contains("unsupported API response shape"));
    }

    #[test]
    fn finish_checks_width_and_normalizes() {
        let embedder = ApiEmbedder::new(&api_config("custom")).unwrap();
        let v = embedder.finish(vec![3.0, 4.0, 0.0]).unwrap();
        assert!((v[0] - 0.6).abs() < 1e-6);

        let err = embedder.finish(vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::DimensionMismatch {
                expected: 3,
                got: 1
            }
        ));
    }

    #[test]
    fn new_requires_url() {
        let cfg = SemanticConfig {
            mode: "api".into(),
            ..SemanticConfig::default()
        };
        assert!(ApiEmbedder::new(&cfg).is_err());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        let embedder = ApiEmbedder::new(&api_config("hf")).unwrap();
        let err = embedder.embed("relay").await.unwrap_err();
        assert!(matches!(err, SemanticError::Request(_)));
    }
}
