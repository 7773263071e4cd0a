//! # Company Catalog (`catalog`)
//!
//! This crate owns the read side of the company directory: the
//! [`CompanyRecord`] type, the [`CompanyCatalog`] capability the ranking
//! layer queries, and the storage engines that implement it.
//!
//! ## Lookup primitives
//!
//! Every catalog answers five independent name lookups plus a row count:
//!
//! - `exact_match`: case-insensitive equality with the stored name.
//! - `prefix_match`: the lowercase name starts with the lowercase query.
//! - `substring_match`: the lowercase name contains the lowercase query.
//! - `similarity_match`: trigram similarity (see [`trigram`]) above a threshold.
//! - `full_text_match`: every stemmed query term occurs in the stemmed name.
//!
//! None of them rank or cap results; merging tiers is the matcher's job.
//!
//! ## Engines
//!
//! - [`IndexedCatalog`]: records live in a pluggable key/value
//!   [`CatalogBackend`] (in-memory or redb), encoded with bincode and
//!   optionally zstd-compressed. Lookups run against an immutable, fully
//!   indexed snapshot rebuilt on [`IndexedCatalog::refresh`].
//! - `PgCatalog` (feature `backend-postgres`): runs each lookup as one SQL
//!   statement against a `companies` table using `pg_trgm` and
//!   `plainto_tsquery('english', ...)`.
//!
//! ## Example Usage
//!
//! ```
//! use catalog::{CompanyCatalog, CompanyRecord, IndexedCatalog};
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let catalog = IndexedCatalog::from_records(vec![
//!     CompanyRecord::new("Acme Corp", Some("acme.com")),
//!     CompanyRecord::new("Globex", None),
//! ])
//! .unwrap();
//!
//! let hits = catalog.prefix_match("acm").await.unwrap();
//! assert_eq!(hits[0].name, "Acme Corp");
//! # });
//! # }
//! ```

mod backend;
mod codec;
mod fulltext;
mod indexed;
#[cfg(feature = "backend-postgres")]
mod postgres;
pub mod trigram;

pub use backend::{BackendConfig, CatalogBackend, InMemoryBackend};
#[cfg(feature = "backend-redb")]
pub use backend::RedbBackend;
pub use codec::{CompressionCodec, CompressionConfig};
pub use indexed::{CatalogConfig, IndexedCatalog};
#[cfg(feature = "backend-postgres")]
pub use postgres::{PgCatalog, PgCatalogConfig};

use async_trait::async_trait;
use bincode::error::{DecodeError, EncodeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bump this value whenever the stored `CompanyRecord` layout changes.
pub const CATALOG_SCHEMA_VERSION: u16 = 1;

/// A single company entry.
///
/// Serialized on the wire as `{"company_name": ..., "website": ...}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompanyRecord {
    /// Company name exactly as stored; the identity used for deduplication.
    #[serde(rename = "company_name")]
    pub name: String,
    /// Company website, if known.
    pub website: Option<String>,
}

impl CompanyRecord {
    pub fn new(name: impl Into<String>, website: Option<&str>) -> Self {
        Self {
            name: name.into(),
            website: website.map(str::to_string),
        }
    }
}

/// Read-only lookup capability over a company catalog.
///
/// Implementations must return a state valid at some point no earlier than
/// the call; callers never write through this trait.
#[async_trait]
pub trait CompanyCatalog: Send + Sync {
    /// Records whose name equals `name`, ignoring case.
    async fn exact_match(&self, name: &str) -> Result<Vec<CompanyRecord>, CatalogError>;

    /// Records whose name starts with `name`, ignoring case.
    async fn prefix_match(&self, name: &str) -> Result<Vec<CompanyRecord>, CatalogError>;

    /// Records whose name contains `name`, ignoring case.
    async fn substring_match(&self, name: &str) -> Result<Vec<CompanyRecord>, CatalogError>;

    /// Records whose trigram similarity to `name` is strictly above `threshold`.
    async fn similarity_match(
        &self,
        name: &str,
        threshold: f32,
    ) -> Result<Vec<(CompanyRecord, f32)>, CatalogError>;

    /// Records whose indexed name matches every term of `query`.
    ///
    /// Returns [`CatalogError::MalformedFullTextQuery`] when the text-search
    /// subsystem rejects the query.
    async fn full_text_match(&self, query: &str) -> Result<Vec<CompanyRecord>, CatalogError>;

    /// Total number of records.
    async fn count(&self) -> Result<usize, CatalogError>;

    /// Whether this catalog maintains a full-text index at all.
    fn supports_full_text(&self) -> bool {
        true
    }
}

/// Errors raised by catalog engines.
#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("malformed full-text query: {0}")]
    MalformedFullTextQuery(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("serialization encode error: {0}")]
    Encode(String),
    #[error("serialization decode error: {0}")]
    Decode(String),
    #[error("compression error: {0}")]
    Compression(String),
    #[error("full-text index error: {0}")]
    FullText(String),
    #[error("invalid catalog config: {0}")]
    Config(String),
}

impl CatalogError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    /// True when only the full-text tier rejected its input.
    pub fn is_malformed_query(&self) -> bool {
        matches!(self, Self::MalformedFullTextQuery(_))
    }
}

impl From<EncodeError> for CatalogError {
    fn from(e: EncodeError) -> Self {
        CatalogError::Encode(e.to_string())
    }
}

impl From<DecodeError> for CatalogError {
    fn from(e: DecodeError) -> Self {
        CatalogError::Decode(e.to_string())
    }
}

impl From<tantivy::TantivyError> for CatalogError {
    fn from(e: tantivy::TantivyError) -> Self {
        CatalogError::FullText(e.to_string())
    }
}
