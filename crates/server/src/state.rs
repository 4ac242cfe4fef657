use crate::config::ServerConfig;
use crate::embed::{embed_products, EmbedScope, DEFAULT_BATCH_SIZE};
use crate::error::ServerResult;
use catalog::{CatalogSnapshot, CatalogSource, JsonCatalogSource};
use metrics_exporter_prometheus::PrometheusHandle;
use ranking::SearchEngine;
use semantic::Embedder;
use std::sync::{Arc, RwLock};
use subtle::{Choice, ConstantTimeEq};

/// Shared application state
///
/// Handlers clone the current [`SearchEngine`] out of the lock and work on
/// that copy, so a reload never disturbs a request that already started.
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    engine: RwLock<Arc<SearchEngine>>,

    /// Query embedder, reused by every engine built for this process
    embedder: Arc<dyn Embedder>,

    /// Serializes reloads; searches never touch it
    reload_lock: tokio::sync::Mutex<()>,

    metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Build the embedder, load the configured catalog and index it.
    pub async fn bootstrap(config: ServerConfig) -> ServerResult<Self> {
        let embedder = semantic::build_embedder(&config.semantic)?;
        let engine = load_engine(&config, &embedder).await?;
        Ok(Self::assemble(config, engine, embedder))
    }

    /// Wrap an engine that was built elsewhere.
    pub fn from_engine(config: ServerConfig, engine: SearchEngine) -> Self {
        let embedder = engine.embedder().clone();
        Self::assemble(config, engine, embedder)
    }

    fn assemble(config: ServerConfig, engine: SearchEngine, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            config: Arc::new(config),
            engine: RwLock::new(Arc::new(engine)),
            embedder,
            reload_lock: tokio::sync::Mutex::new(()),
            metrics: None,
        }
    }

    /// Attach the Prometheus handle rendered by `GET /metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn metrics_handle(&self) -> Option<&PrometheusHandle> {
        self.metrics.as_ref()
    }

    /// The engine currently serving searches.
    pub fn engine(&self) -> Arc<SearchEngine> {
        self.engine
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Publish `engine` for every request that starts after this call.
    pub fn swap_engine(&self, engine: SearchEngine) -> Arc<SearchEngine> {
        let engine = Arc::new(engine);
        let mut slot = self
            .engine
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = engine.clone();
        engine
    }

    /// Rebuild snapshot and index from the catalog source, then swap them in.
    ///
    /// On failure the running engine is left untouched.
    pub async fn reload(&self) -> ServerResult<Arc<SearchEngine>> {
        let _guard = self.reload_lock.lock().await;
        let engine = load_engine(&self.config, &self.embedder).await?;
        let engine = self.swap_engine(engine);
        tracing::info!(
            products = engine.snapshot().len(),
            available = engine.is_available(),
            "catalog reloaded"
        );
        Ok(engine)
    }

    /// Check if API key is valid
    ///
    /// Every configured key is compared in constant time and none short-circuits.
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        let mut valid = Choice::from(0);
        for candidate in &self.config.api_keys {
            valid |= candidate.as_bytes().ct_eq(key.as_bytes());
        }
        valid.into()
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("engine", &self.engine())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

/// Load the catalog named by `config` and build a complete engine over it.
///
/// Without a catalog path the engine is empty and every search answers 503.
async fn load_engine(
    config: &ServerConfig,
    embedder: &Arc<dyn Embedder>,
) -> ServerResult<SearchEngine> {
    let snapshot = match &config.catalog.path {
        Some(path) => {
            let source = JsonCatalogSource::new(path);
            let mut dump = tokio::task::spawn_blocking(move || source.load()).await??;
            if config.catalog.embed_missing {
                embed_products(
                    &mut dump,
                    embedder.as_ref(),
                    EmbedScope::Missing,
                    DEFAULT_BATCH_SIZE,
                )
                .await?;
            }
            CatalogSnapshot::from_dump(dump)?
        }
        None => {
            tracing::warn!("No catalog path configured");
            CatalogSnapshot::default()
        }
    };

    tracing::info!(
        products = snapshot.len(),
        skipped = snapshot.skipped(),
        dimension = snapshot.dimension(),
        "products loaded into memory"
    );

    let embedder = embedder.clone();
    let ranking = config.ranking.clone();
    let engine = tokio::task::spawn_blocking(move || {
        SearchEngine::new(Arc::new(snapshot), embedder, ranking)
    })
    .await??;
    Ok(engine)
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
    pub products: usize,
    pub search_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{CatalogDump, ProductRow};
    use semantic::StubEmbedder;

    fn write_catalog(dir: &tempfile::TempDir, products: Vec<ProductRow>) -> std::path::PathBuf {
        let path = dir.path().join("catalog.json");
        let dump = CatalogDump {
            categories: Vec::new(),
            products,
        };
        JsonCatalogSource::new(&path).store(&dump).unwrap();
        path
    }

    fn config_for(path: Option<std::path::PathBuf>) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.catalog.path = path;
        config.semantic.dimension = 32;
        config
    }

    #[tokio::test]
    async fn bootstrap_without_catalog_is_unavailable() {
        let state = ServerState::bootstrap(config_for(None)).await.unwrap();
        assert!(!state.engine().is_available());
    }

    #[tokio::test]
    async fn embed_missing_fills_unembedded_products() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(
            &dir,
            vec![ProductRow::new(1, "Relay"), ProductRow::new(2, "Diode")],
        );

        let state = ServerState::bootstrap(config_for(Some(path.clone())))
            .await
            .unwrap();
        assert_eq!(state.engine().snapshot().len(), 0);

        let mut config = config_for(Some(path));
        config.catalog.embed_missing = true;
        let state = ServerState::bootstrap(config).await.unwrap();
        assert_eq!(state.engine().snapshot().len(), 2);
        assert!(state.engine().is_available());
    }

    #[tokio::test]
    async fn reload_swaps_in_new_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = StubEmbedder::new(32);
        let path = write_catalog(
            &dir,
            vec![ProductRow::new(1, "Relay").with_embedding(&embedder.embed_sync("Relay"))],
        );
        let state = ServerState::bootstrap(config_for(Some(path.clone())))
            .await
            .unwrap();
        let before = state.engine();
        assert_eq!(before.snapshot().len(), 1);

        write_catalog(
            &dir,
            vec![
                ProductRow::new(1, "Relay").with_embedding(&embedder.embed_sync("Relay")),
                ProductRow::new(2, "Diode").with_embedding(&embedder.embed_sync("Diode")),
            ],
        );
        let after = state.reload().await.unwrap();
        assert_eq!(after.snapshot().len(), 2);
        assert_eq!(state.engine().snapshot().len(), 2);
        // The old engine is still intact for whoever holds it.
        assert_eq!(before.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn failed_reload_keeps_running_engine() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = StubEmbedder::new(32);
        let path = write_catalog(
            &dir,
            vec![ProductRow::new(1, "Relay").with_embedding(&embedder.embed_sync("Relay"))],
        );
        let state = ServerState::bootstrap(config_for(Some(path.clone())))
            .await
            .unwrap();

        std::fs::write(&path, b"{ not json").unwrap();
        assert!(state.reload().await.is_err());
        assert_eq!(state.engine().snapshot().len(), 1);
    }

    #[test]
    fn api_keys() {
        let mut config = ServerConfig::default();
        config.api_keys.insert("admin-key".into());
        let engine = SearchEngine::new(
            Arc::new(CatalogSnapshot::default()),
            Arc::new(StubEmbedder::new(8)),
            Default::default(),
        )
        .unwrap();
        config.api_keys.insert("second-key".into());
        let state = ServerState::from_engine(config, engine);
        assert!(state.is_valid_api_key("admin-key"));
        assert!(state.is_valid_api_key("second-key"));
        assert!(!state.is_valid_api_key("other"));
        assert!(!state.is_valid_api_key("admin"));
        assert!(!state.is_valid_api_key("admin-key-extra"));
        assert!(!state.is_valid_api_key(""));
    }
}
