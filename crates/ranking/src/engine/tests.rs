use super::*;
use async_trait::async_trait;
use catalog::ProductRow;
use semantic::SemanticError;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::types::ErrorKind;

/// Returns the same vector for every text and counts calls.
struct FixedEmbedder {
    vector: Vec<f32>,
    calls: AtomicUsize,
}

impl FixedEmbedder {
    fn new(vector: Vec<f32>) -> Arc<Self> {
        Arc::new(Self {
            vector,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, SemanticError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector.clone())
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, SemanticError> {
        Err(SemanticError::Request("connection refused".into()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Product `i` gets embedding `[1, 0.01 * i]`: against the query `[1, 0]`
/// similarity strictly decreases with `i`.
fn product(i: usize, name: &str, category: Option<i64>) -> ProductRow {
    let mut row = ProductRow::new(100 + i as i64, name).with_embedding(&[1.0, 0.01 * i as f32]);
    row.category_id = category;
    row
}

fn engine_with(rows: Vec<ProductRow>, embedder: Arc<dyn Embedder>) -> SearchEngine {
    let snapshot = CatalogSnapshot::build(rows, Vec::new()).unwrap();
    SearchEngine::new(Arc::new(snapshot), embedder, RankingConfig::default()).unwrap()
}

fn engine(rows: Vec<ProductRow>) -> SearchEngine {
    engine_with(rows, FixedEmbedder::new(vec![1.0, 0.0]))
}

fn positions(page: &SearchPage) -> Vec<i64> {
    page.product_ids.iter().map(|id| id - 100).collect()
}

#[tokio::test]
async fn empty_catalog_is_unavailable_without_embedding() {
    let embedder = FixedEmbedder::new(vec![1.0, 0.0]);
    let engine = engine_with(Vec::new(), embedder.clone());

    assert!(!engine.is_available());
    let err = engine.search(&SearchRequest::new("relay")).await.unwrap_err();
    assert!(matches!(err, SearchError::Unavailable));
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn unavailable_takes_precedence_over_bad_input() {
    let engine = engine(Vec::new());
    let err = engine.search(&SearchRequest::new("  ")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let engine = engine(vec![product(0, "Relay", Some(1))]);
    let err = engine.search(&SearchRequest::new(" \t ")).await.unwrap_err();
    assert!(matches!(err, SearchError::InvalidInput { field: "q", .. }));
}

#[tokio::test]
async fn bad_pagination_is_rejected_before_embedding() {
    let embedder = FixedEmbedder::new(vec![1.0, 0.0]);
    let engine = engine_with(vec![product(0, "Relay", Some(1))], embedder.clone());

    let err = engine
        .search(&SearchRequest::new("relay").with_page(0, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidInput { field: "page", .. }));

    let err = engine
        .search(&SearchRequest::new("relay").with_page(1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidInput { field: "limit", .. }));
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn plain_query_keeps_relevance_order() {
    let rows = (0..5).map(|i| product(i, &format!("Item {i}"), Some(1))).collect();
    let page = engine(rows).search(&SearchRequest::new("resistor")).await.unwrap();
    assert_eq!(positions(&page), vec![0, 1, 2, 3, 4]);
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn keyword_boost_reorders_results() {
    let rows = vec![
        product(0, "Heat Shrink Tubing", None),
        product(1, "Solder Wire", None),
        product(2, "Solder Wire Kit", None),
    ];
    let engine = engine(rows);

    let ranked = engine
        .rank(&[1.0, 0.0], "soldering kit", CategorySelector::All)
        .unwrap();
    let ids: Vec<i64> = ranked.iter().map(|c| c.product_id - 100).collect();
    assert_eq!(ids, vec![2, 1, 0]);
    assert!((ranked[0].boost - 1.2).abs() < 1e-6);
    assert!((ranked[1].boost - 1.0).abs() < 1e-6);
    assert_eq!(ranked[2].boost, 0.0);
}

#[tokio::test]
async fn project_query_diversifies_by_tier() {
    let categories = [6, 1, 1, 1, 4, 7, 4, 4, 6, 6, 1, 7];
    let rows = categories
        .iter()
        .enumerate()
        .map(|(i, c)| product(i, &format!("Item {i}"), Some(*c)))
        .collect();
    let engine = engine(rows);

    let page = engine
        .search(&SearchRequest::new("build a radio").with_page(1, 20))
        .await
        .unwrap();
    assert_eq!(
        positions(&page),
        vec![1, 2, 4, 6, 0, 8, 5, 11, 3, 7, 9, 10]
    );

    // No category shows a third member inside the first six.
    let head: Vec<i64> = positions(&page)[..6]
        .iter()
        .map(|&pos| categories[pos as usize])
        .collect();
    assert_eq!(head, vec![1, 1, 4, 4, 6, 6]);
}

#[tokio::test]
async fn non_project_query_is_not_diversified() {
    let categories = [6, 1, 1, 1, 4];
    let rows = categories
        .iter()
        .enumerate()
        .map(|(i, c)| product(i, &format!("Item {i}"), Some(*c)))
        .collect();
    let page = engine(rows)
        .search(&SearchRequest::new("capacitor"))
        .await
        .unwrap();
    assert_eq!(positions(&page), vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn category_filter_restricts_and_counts_matches() {
    let rows = (0..42)
        .map(|i| {
            let category = if i % 8 == 5 { 9 } else { 3 };
            product(i, &format!("Item {i}"), Some(category))
        })
        .collect();
    let engine = engine(rows);
    let snapshot = engine.snapshot().clone();

    let mut lengths = Vec::new();
    for page in 1..=4 {
        let req = SearchRequest::new("build a robot")
            .with_category(json!("3"))
            .with_page(page, 10);
        let result = engine.search(&req).await.unwrap();
        assert_eq!(result.total, 37);
        for id in &result.product_ids {
            assert_eq!(snapshot.get(*id).unwrap().category_id, Some(3));
        }
        lengths.push(result.product_ids.len());
    }
    assert_eq!(lengths, vec![10, 10, 10, 7]);

    let beyond = engine
        .search(
            &SearchRequest::new("build a robot")
                .with_category(json!(3))
                .with_page(5, 10),
        )
        .await
        .unwrap();
    assert!(beyond.product_ids.is_empty());
    assert_eq!(beyond.total, 37);
}

#[tokio::test]
async fn filtered_results_stay_in_relevance_order() {
    // Would be reordered by the tier walk if diversification ran.
    let categories = [6, 1, 6, 1];
    let rows = categories
        .iter()
        .enumerate()
        .map(|(i, c)| product(i, &format!("Item {i}"), Some(*c)))
        .collect();
    let engine = engine(rows);

    let page = engine
        .search(&SearchRequest::new("build").with_category(json!(6)))
        .await
        .unwrap();
    assert_eq!(positions(&page), vec![0, 2]);
}

#[tokio::test]
async fn unparseable_category_means_no_filter() {
    let categories = [6, 1, 6, 1];
    let rows = categories
        .iter()
        .enumerate()
        .map(|(i, c)| product(i, &format!("Item {i}"), Some(*c)))
        .collect();
    let engine = engine(rows);

    let page = engine
        .search(&SearchRequest::new("build").with_category(json!("tools")))
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    // Diversification still applies: category 1 comes first.
    assert_eq!(positions(&page), vec![1, 3, 0, 2]);
}

#[tokio::test]
async fn identical_requests_give_identical_pages() {
    let rows = (0..30)
        .map(|i| product(i, &format!("Kit part {i}"), Some((i % 14) as i64 + 1)))
        .collect();
    let engine = engine(rows);
    let req = SearchRequest::new("starter kit").with_page(2, 7);

    let first = engine.search(&req).await.unwrap();
    for _ in 0..5 {
        assert_eq!(engine.search(&req).await.unwrap(), first);
    }
}

#[tokio::test]
async fn boosts_never_lower_scores() {
    let names = [
        "Solder Wire",
        "Soldering Iron Kit",
        "Desoldering Pump",
        "Jumper Wires",
        "Multimeter",
        "Wire Stripper Tool",
    ];
    let rows = names
        .iter()
        .enumerate()
        .map(|(i, n)| product(i, n, None))
        .collect();
    let engine = engine(rows);

    let ranked = engine
        .rank(&[1.0, 0.0], "soldering wire tool", CategorySelector::All)
        .unwrap();
    assert_eq!(ranked.len(), names.len());
    for candidate in &ranked {
        assert!(candidate.boost >= 0.0);
        assert!(candidate.final_score >= candidate.semantic_score);
        if candidate.boost == 0.0 {
            assert_eq!(candidate.final_score, candidate.semantic_score);
        }
    }
    let multimeter = ranked.iter().find(|c| c.product_id == 104).unwrap();
    assert_eq!(multimeter.boost, 0.0);
}

#[tokio::test]
async fn embedding_failure_is_internal() {
    let engine = engine_with(vec![product(0, "Relay", None)], Arc::new(FailingEmbedder));
    let err = engine.search(&SearchRequest::new("relay")).await.unwrap_err();
    assert!(matches!(err, SearchError::Embedding(_)));
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[tokio::test]
async fn wrong_query_width_is_internal() {
    let engine = engine_with(
        vec![product(0, "Relay", None)],
        FixedEmbedder::new(vec![1.0, 0.0, 0.0]),
    );
    let err = engine.search(&SearchRequest::new("relay")).await.unwrap_err();
    assert!(matches!(err, SearchError::DimensionMismatch { .. }));
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[test]
fn invalid_config_is_rejected() {
    let snapshot = Arc::new(CatalogSnapshot::default());
    let config = RankingConfig {
        retrieval_k: 0,
        ..RankingConfig::default()
    };
    let err = SearchEngine::new(snapshot, FixedEmbedder::new(vec![1.0]), config).unwrap_err();
    assert!(matches!(err, SearchError::Config(_)));
}

#[test]
fn small_retrieval_width_limits_candidates() {
    let rows: Vec<_> = (0..20).map(|i| product(i, &format!("Item {i}"), None)).collect();
    let snapshot = CatalogSnapshot::build(rows, Vec::new()).unwrap();
    let config = RankingConfig {
        retrieval_k: 5,
        ..RankingConfig::default()
    };
    let engine = SearchEngine::new(
        Arc::new(snapshot),
        FixedEmbedder::new(vec![1.0, 0.0]),
        config,
    )
    .unwrap();
    let ranked = engine
        .rank(&[1.0, 0.0], "anything", CategorySelector::All)
        .unwrap();
    let ids: Vec<i64> = ranked.iter().map(|c| c.product_id - 100).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}
