//! bizsearch server: HTTP API over the ranked company search.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - service banner
//! - `GET /api/search?q=<text>` - ranked matches, `{results, count, query}`
//! - `GET /api/stats` - `{total_companies, database, timestamp}`
//! - `GET /health` - liveness probe
//! - `GET /ready` - readiness probe, 503 when the catalog is unreachable
//! - `GET /metrics` - Prometheus metrics
//!
//! Errors are returned as `{"error": "<message>"}`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
