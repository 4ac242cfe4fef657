use ranking::RankingConfig;
use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Deadline for one search pipeline run; expiry answers 503
    #[serde(default = "default_search_timeout_ms")]
    pub search_timeout_ms: u64,

    /// Maximum request body size in KB
    #[serde(default = "default_max_body_size_kb")]
    pub max_body_size_kb: usize,

    /// API keys accepted on the admin routes
    #[serde(default)]
    pub api_keys: HashSet<String>,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level or full `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `"json"` or `"pretty"`
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub semantic: SemanticConfig,

    #[serde(default)]
    pub ranking: RankingConfig,
}

/// Where the catalog comes from.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON catalog dump. Without one the server starts with search disabled.
    pub path: Option<PathBuf>,

    /// Embed products that have no stored embedding while loading.
    pub embed_missing: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            search_timeout_ms: default_search_timeout_ms(),
            max_body_size_kb: default_max_body_size_kb(),
            api_keys: HashSet::new(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            metrics_enabled: default_true(),
            catalog: CatalogConfig::default(),
            semantic: SemanticConfig::default(),
            ranking: RankingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server.*` file and
    /// `CATALOG_SEARCH__*` environment variables, in increasing precedence.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(config::Environment::with_prefix("CATALOG_SEARCH").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        if config.api_keys.is_empty() {
            tracing::warn!("No API keys configured; admin routes will reject every request");
        }

        Ok(config)
    }

    /// Reject settings that would only fail later, at request time.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.search_timeout_ms == 0 {
            anyhow::bail!("search_timeout_ms must be greater than zero");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        self.semantic.validate()?;
        self.ranking.validate()?;
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_kb * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_search_timeout_ms() -> u64 {
    10_000
}

fn default_max_body_size_kb() -> usize {
    64
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.search_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.max_body_size(), 64 * 1024);
        assert_eq!(cfg.log_format, "json");
        assert!(cfg.enable_cors);
        assert!(cfg.metrics_enabled);
        assert!(cfg.catalog.path.is_none());
        assert!(!cfg.catalog.embed_missing);
        assert_eq!(cfg.ranking.retrieval_k, 250);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_nested_sections_deserialize() {
        let cfg: ServerConfig = serde_json::from_value(serde_json::json!({
            "port": 8081,
            "catalog": { "path": "catalog.json", "embed_missing": true },
            "semantic": { "dimension": 64 },
            "ranking": { "retrieval_k": 50, "diversify": { "max_per_category": 3 } }
        }))
        .unwrap();

        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.catalog.path, Some(PathBuf::from("catalog.json")));
        assert!(cfg.catalog.embed_missing);
        assert_eq!(cfg.semantic.dimension, 64);
        assert_eq!(cfg.semantic.mode, "stub");
        assert_eq!(cfg.ranking.retrieval_k, 50);
        assert_eq!(cfg.ranking.diversify.max_per_category, 3);
        assert_eq!(cfg.ranking.boost.exact, 1.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = ServerConfig {
            search_timeout_ms: 0,
            ..ServerConfig::default()
        };
        assert!(cfg.validate().is_err());

        cfg.search_timeout_ms = 100;
        cfg.ranking.retrieval_k = 0;
        assert!(cfg.validate().is_err());
    }
}
