use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::telemetry;
use catalog::CompanyCatalog;
use matcher::RankedMatcher;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Catalog shared by every request
    pub catalog: Arc<dyn CompanyCatalog>,

    /// Ranking engine
    pub matcher: Arc<RankedMatcher>,

    /// Prometheus renderer, present when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Open the configured catalog and build the matcher.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let catalog = bizsearch::open_catalog(&config.search.catalog)
            .map_err(|e| ServerError::Config(e.to_string()))?;
        tracing::info!(
            backend = config.search.catalog.backend.as_str(),
            "catalog opened"
        );
        Self::with_catalog(config, catalog)
    }

    /// Build state around an existing catalog.
    pub fn with_catalog(
        config: ServerConfig,
        catalog: Arc<dyn CompanyCatalog>,
    ) -> ServerResult<Self> {
        let matcher = RankedMatcher::new(config.search.matcher.clone())
            .map_err(|e| ServerError::Config(e.to_string()))?;
        let metrics = if config.metrics_enabled {
            Some(telemetry::install_metrics().map_err(|e| ServerError::Config(e.to_string()))?)
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            catalog,
            matcher: Arc::new(matcher),
            metrics,
        })
    }
}
