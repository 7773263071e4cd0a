//! PostgreSQL catalog over a `companies(company_name, website, tsv)` table.
//!
//! The fuzzy tier needs the `pg_trgm` extension and the full-text tier needs
//! a `tsv tsvector` column built with the `english` configuration.

use crate::{CatalogError, CompanyCatalog, CompanyRecord};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::warn;

/// SQLSTATE `syntax_error`.
const SYNTAX_ERROR: &str = "42601";

const EXACT_SQL: &str = "SELECT company_name, website FROM companies \
     WHERE lower(company_name) = lower($1) ORDER BY company_name, website";
const PREFIX_SQL: &str = "SELECT company_name, website FROM companies \
     WHERE starts_with(lower(company_name), lower($1)) ORDER BY company_name, website";
const SUBSTRING_SQL: &str = "SELECT company_name, website FROM companies \
     WHERE strpos(lower(company_name), lower($1)) > 0 ORDER BY company_name, website";
const SIMILARITY_SQL: &str = "SELECT company_name, website, similarity(company_name, $1) AS score \
     FROM companies WHERE similarity(company_name, $1) > $2 ORDER BY company_name, website";
const FULL_TEXT_SQL: &str = "SELECT company_name, website FROM companies \
     WHERE tsv @@ plainto_tsquery('english', $1) ORDER BY company_name, website";
const COUNT_SQL: &str = "SELECT COUNT(*) FROM companies";

#[derive(Clone, Debug)]
pub struct PgCatalogConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl PgCatalogConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Catalog backed by a lazily connected pool; an unreachable database
/// surfaces per call as [`CatalogError::Unavailable`].
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn connect_lazy(cfg: &PgCatalogConfig) -> Result<Self, CatalogError> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(cfg.acquire_timeout)
            .connect_lazy(&cfg.database_url)
            .map_err(|e| CatalogError::Config(format!("invalid database url: {e}")))?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, sql: &str, name: &str) -> Result<Vec<CompanyRecord>, sqlx::Error> {
        let rows: Vec<(String, Option<String>)> =
            sqlx::query_as(sql).bind(name).fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(name, website)| CompanyRecord { name, website })
            .collect())
    }
}

fn unavailable(err: sqlx::Error) -> CatalogError {
    CatalogError::Unavailable(err.to_string())
}

fn classify_full_text(err: sqlx::Error) -> CatalogError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(SYNTAX_ERROR) {
            warn!(error = %db, "text-search query rejected");
            return CatalogError::MalformedFullTextQuery(db.message().to_string());
        }
    }
    unavailable(err)
}

#[async_trait]
impl CompanyCatalog for PgCatalog {
    async fn exact_match(&self, name: &str) -> Result<Vec<CompanyRecord>, CatalogError> {
        self.fetch(EXACT_SQL, name).await.map_err(unavailable)
    }

    async fn prefix_match(&self, name: &str) -> Result<Vec<CompanyRecord>, CatalogError> {
        self.fetch(PREFIX_SQL, name).await.map_err(unavailable)
    }

    async fn substring_match(&self, name: &str) -> Result<Vec<CompanyRecord>, CatalogError> {
        self.fetch(SUBSTRING_SQL, name).await.map_err(unavailable)
    }

    async fn similarity_match(
        &self,
        name: &str,
        threshold: f32,
    ) -> Result<Vec<(CompanyRecord, f32)>, CatalogError> {
        let rows: Vec<(String, Option<String>, f32)> = sqlx::query_as(SIMILARITY_SQL)
            .bind(name)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(rows
            .into_iter()
            .map(|(name, website, score)| (CompanyRecord { name, website }, score))
            .collect())
    }

    async fn full_text_match(&self, query: &str) -> Result<Vec<CompanyRecord>, CatalogError> {
        self.fetch(FULL_TEXT_SQL, query)
            .await
            .map_err(classify_full_text)
    }

    async fn count(&self) -> Result<usize, CatalogError> {
        let (total,): (i64,) = sqlx::query_as(COUNT_SQL)
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(usize::try_from(total).unwrap_or(0))
    }
}
