//! HTTP front end for catalog search.
//!
//! Serves `POST /search` over a [`ranking::SearchEngine`] held in
//! [`ServerState`], plus category listing, health probes, Prometheus metrics
//! and an authenticated catalog reload.

pub mod config;
pub mod embed;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{CatalogConfig, ServerConfig};
pub use embed::{embed_products, EmbedScope};
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
