//! YAML configuration for the catalog and the ranking layer.
//!
//! ```yaml
//! version: "1.0"
//!
//! catalog:
//!   backend: redb            # memory | redb | postgres
//!   path: /var/lib/bizsearch/companies.redb
//!   seed_path: data/companies.json
//!   compression: zstd        # none | zstd
//!   full_text: true
//!
//! matcher:
//!   max_results: 20
//!   similarity_threshold: 0.3
//!   full_text: true
//! ```
//!
//! For `backend: postgres` set `database_url` (the server also falls back to
//! the `DATABASE_URL` environment variable).

use std::fs;
use std::path::{Path, PathBuf};

use catalog::CompressionCodec;
use matcher::MatchConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Top-level search configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub matcher: MatchConfig,
}

impl SearchConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: SearchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.catalog.validate()?;
        self.matcher
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            catalog: CatalogSettings::default(),
            matcher: MatchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackendKind {
    #[default]
    Memory,
    Redb,
    Postgres,
}

impl CatalogBackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogBackendKind::Memory => "memory",
            CatalogBackendKind::Redb => "redb",
            CatalogBackendKind::Postgres => "postgres",
        }
    }
}

/// Where company records come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogSettings {
    #[serde(default)]
    pub backend: CatalogBackendKind,

    /// redb database file.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// PostgreSQL connection string.
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// JSON array of records loaded when an embedded catalog starts empty.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,

    #[serde(default)]
    pub compression: CompressionCodec,

    /// Build the embedded full-text index.
    #[serde(default = "true_value")]
    pub full_text: bool,
}

impl CatalogSettings {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.backend {
            CatalogBackendKind::Memory => Ok(()),
            CatalogBackendKind::Redb if self.path.is_none() => {
                Err(ConfigLoadError::MissingField("catalog.path".into()))
            }
            CatalogBackendKind::Redb => Ok(()),
            CatalogBackendKind::Postgres => {
                if self.database_url.as_deref().is_none_or(str::is_empty) {
                    return Err(ConfigLoadError::MissingField("catalog.database_url".into()));
                }
                if self.max_connections == 0 {
                    return Err(ConfigLoadError::Validation(
                        "catalog.max_connections must be greater than zero".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            backend: CatalogBackendKind::default(),
            path: None,
            database_url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            seed_path: None,
            compression: CompressionCodec::default(),
            full_text: true,
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn true_value() -> bool {
    true
}
