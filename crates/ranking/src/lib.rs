//! # Catalog Ranking (`ranking`)
//!
//! ## Purpose
//!
//! `ranking` turns a free-text query into an ordered page of product ids. It
//! sits on top of the catalog snapshot (`catalog`), the vector index (`index`)
//! and the query embedder (`semantic`), and owns everything that happens
//! between "we have a query vector" and "here is page 2".
//!
//! ## Pipeline
//!
//! Every request runs the same linear sequence of pure stages:
//!
//! 1. [`CandidateRetriever`] asks the index for the top `retrieval_k` rows and
//!    rescores each one by exact cosine similarity.
//! 2. [`KeywordBooster`] adds a lexical bonus per query word (stem match,
//!    generic-word stem match, or substring containment) and stable-sorts by
//!    the boosted score.
//! 3. With a category filter, [`CategorySelector`] keeps that category only.
//!    Otherwise, when the query mentions a project/build keyword,
//!    [`ProjectDiversifier`] walks the configured category tiers so the first
//!    page shows a spread of component roles.
//! 4. [`Pagination`] slices the final list and reports its total length.
//!
//! [`SearchEngine`] wires the stages together and is the type services hold.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use catalog::{CatalogSnapshot, ProductRow};
//! use ranking::{RankingConfig, SearchEngine, SearchRequest};
//! use semantic::StubEmbedder;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let embedder = StubEmbedder::new(256);
//! let rows = ["Solder Wire", "Soldering Iron", "Breadboard"]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, name)| {
//!         ProductRow::new(i as i64 + 1, *name).with_embedding(&embedder.embed_sync(name))
//!     })
//!     .collect::<Vec<_>>();
//! let snapshot = CatalogSnapshot::build(rows, Vec::new()).unwrap();
//!
//! let engine = SearchEngine::new(
//!     Arc::new(snapshot),
//!     Arc::new(embedder),
//!     RankingConfig::default(),
//! )
//! .unwrap();
//!
//! let page = engine.search(&SearchRequest::new("solder")).await.unwrap();
//! assert_eq!(page.total, 3);
//! assert_eq!(page.product_ids[0], 1);
//! # }
//! ```

pub mod config;
pub mod diversify;
pub mod engine;
pub mod filter;
pub mod keyword;
pub mod paginate;
pub mod retriever;
pub mod stemmer;
pub mod types;

pub use crate::config::{
    BoostConfig, CategoryTier, ConfigError, DiversifyConfig, RankingConfig, DEFAULT_MAX_PER_CATEGORY,
    DEFAULT_RETRIEVAL_K,
};
pub use crate::diversify::{CategoryBuckets, ProjectDiversifier};
pub use crate::engine::SearchEngine;
pub use crate::filter::{parse_category_id, CategorySelector};
pub use crate::keyword::{KeywordBooster, QueryTerm};
pub use crate::paginate::Pagination;
pub use crate::retriever::CandidateRetriever;
pub use crate::types::{ErrorKind, ScoredCandidate, SearchError, SearchPage, SearchRequest};
