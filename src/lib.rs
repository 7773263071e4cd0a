//! Workspace umbrella crate for bizsearch.
//!
//! Re-exports the catalog and ranking APIs and turns a [`SearchConfig`] into
//! a ready catalog, so the CLI and the HTTP server share one entry point.

mod config;

pub use catalog::{
    BackendConfig, CatalogConfig, CatalogError, CompanyCatalog, CompanyRecord,
    CompressionCodec, CompressionConfig, IndexedCatalog,
};
#[cfg(feature = "postgres")]
pub use catalog::{PgCatalog, PgCatalogConfig};
pub use config::{CatalogBackendKind, CatalogSettings, ConfigLoadError, SearchConfig};
pub use matcher::{
    MatchConfig, MatchError, MatchMetrics, MatchTier, RankedMatcher, ResultSet, ScoredMatch,
    SearchResponse, set_match_metrics,
};

use std::sync::Arc;
use tracing::info;

/// Open the catalog described by `settings`.
///
/// Embedded catalogs that start empty are filled from `seed_path` when set.
pub fn open_catalog(settings: &CatalogSettings) -> Result<Arc<dyn CompanyCatalog>, CatalogError> {
    match settings.backend {
        CatalogBackendKind::Memory | CatalogBackendKind::Redb => {
            Ok(Arc::new(open_indexed_catalog(settings)?))
        }
        CatalogBackendKind::Postgres => open_postgres_catalog(settings),
    }
}

/// Open an embedded catalog and apply the seed file if it is empty.
pub fn open_indexed_catalog(settings: &CatalogSettings) -> Result<IndexedCatalog, CatalogError> {
    let backend = match (settings.backend, &settings.path) {
        (CatalogBackendKind::Redb, Some(path)) => BackendConfig::redb(path),
        (CatalogBackendKind::Redb, None) => {
            return Err(CatalogError::Config("redb backend needs a path".into()));
        }
        _ => BackendConfig::in_memory(),
    };
    let cfg = CatalogConfig::new()
        .with_backend(backend)
        .with_compression(CompressionConfig::default().with_codec(settings.compression.clone()))
        .with_full_text(settings.full_text);
    let catalog = IndexedCatalog::open(cfg)?;

    if let Some(seed) = &settings.seed_path {
        if catalog.is_empty()? {
            let loaded = catalog.load_seed_file(seed)?;
            info!(records = loaded, seed = %seed.display(), "catalog seeded");
        }
    }
    Ok(catalog)
}

#[cfg(feature = "postgres")]
fn open_postgres_catalog(
    settings: &CatalogSettings,
) -> Result<Arc<dyn CompanyCatalog>, CatalogError> {
    let url = settings
        .database_url
        .as_deref()
        .ok_or_else(|| CatalogError::Config("postgres backend needs database_url".into()))?;
    let cfg = PgCatalogConfig {
        max_connections: settings.max_connections,
        acquire_timeout: std::time::Duration::from_secs(settings.acquire_timeout_secs),
        ..PgCatalogConfig::new(url)
    };
    Ok(Arc::new(PgCatalog::connect_lazy(&cfg)?))
}

#[cfg(not(feature = "postgres"))]
fn open_postgres_catalog(
    _settings: &CatalogSettings,
) -> Result<Arc<dyn CompanyCatalog>, CatalogError> {
    Err(CatalogError::Config(
        "postgres backend disabled at compile time".into(),
    ))
}
