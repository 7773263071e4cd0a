//! # Company Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` turns a free-text company query into a short, ranked list of
//! catalog records. It owns no data: every lookup goes through a
//! [`catalog::CompanyCatalog`], and the matcher only merges, ranks and caps.
//!
//! ## Ranking
//!
//! Five tiers are evaluated in priority order:
//!
//! 1. exact name (case-insensitive)
//! 2. name starts with the query
//! 3. name contains the query
//! 4. trigram similarity above [`MatchConfig::similarity_threshold`]
//! 5. English full-text match
//!
//! A name found in several tiers is reported once, in its best tier. Results
//! are ordered by tier then name and capped at [`MatchConfig::max_results`].
//! A full-text query the catalog rejects as malformed only skips tier 5; any
//! other catalog failure aborts the search with [`MatchError::CatalogUnavailable`].
//!
//! ## Example Usage
//!
//! ```
//! use catalog::{CompanyRecord, IndexedCatalog};
//! use matcher::RankedMatcher;
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let catalog = IndexedCatalog::from_records(vec![
//!     CompanyRecord::new("Acme Corp", Some("acme.com")),
//!     CompanyRecord::new("Acme Industries", None),
//! ])
//! .unwrap();
//!
//! let response = RankedMatcher::default()
//!     .search_response("  acme ", &catalog)
//!     .await
//!     .unwrap();
//! assert_eq!(response.query, "acme");
//! assert_eq!(response.count, 2);
//! # });
//! ```
//!
//! ## Observability
//!
//! Install a [`MatchMetrics`] implementation via [`set_match_metrics`] to
//! record latency, per-tier hit counts and failures.

pub mod engine;
pub mod metrics;
pub mod types;

pub use crate::engine::RankedMatcher;
pub use crate::metrics::{set_match_metrics, MatchMetrics};
pub use crate::types::{
    MatchConfig, MatchError, MatchTier, ResultSet, ScoredMatch, SearchResponse,
};
