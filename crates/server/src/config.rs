use bizsearch::SearchConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
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

    /// Deadline for one search, in milliseconds
    #[serde(default = "default_search_timeout_ms")]
    pub search_timeout_ms: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Catalog and ranking settings
    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            search_timeout_ms: default_search_timeout_ms(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            metrics_enabled: default_true(),
            search: SearchConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `server.*` file and `BIZSEARCH__*`
    /// environment variables, e.g. `BIZSEARCH__SEARCH__CATALOG__BACKEND=redb`.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(
                config::Environment::with_prefix("BIZSEARCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;
        config.apply_database_url(std::env::var("DATABASE_URL").ok());
        config.validate()?;
        Ok(config)
    }

    /// Fill the catalog URL from `DATABASE_URL` when the config leaves it unset.
    pub fn apply_database_url(&mut self, url: Option<String>) {
        let catalog = &mut self.search.catalog;
        if catalog.database_url.is_none() {
            catalog.database_url = url.filter(|u| !u.is_empty());
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.search_timeout_ms == 0 {
            anyhow::bail!("search_timeout_ms must be greater than zero");
        }
        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            anyhow::bail!("log_format must be `json` or `pretty`, got {:?}", self.log_format);
        }
        self.search.validate()?;
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
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_search_timeout_ms() -> u64 {
    5_000
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
