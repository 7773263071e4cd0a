use std::collections::HashMap;
use std::time::Instant;

use catalog::{CatalogError, CompanyCatalog, CompanyRecord};
use tracing::{debug, warn};

use crate::metrics::metrics_recorder;
use crate::types::{MatchConfig, MatchError, MatchTier, ResultSet, ScoredMatch, SearchResponse};

/// Ranks catalog records for a free-text company query.
///
/// Tiers are evaluated in [`MatchTier::ALL`] order. A record keeps the best
/// tier it matched in; the merged list is sorted by `(tier, name)` and capped
/// at `max_results`. Records are identified by exact name.
#[derive(Debug, Clone)]
pub struct RankedMatcher {
    cfg: MatchConfig,
}

impl Default for RankedMatcher {
    fn default() -> Self {
        Self {
            cfg: MatchConfig::default(),
        }
    }
}

impl RankedMatcher {
    pub fn new(cfg: MatchConfig) -> Result<Self, MatchError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Ranked records for `query`. Blank queries return an empty set without
    /// touching the catalog.
    pub async fn search(
        &self,
        query: &str,
        catalog: &dyn CompanyCatalog,
    ) -> Result<ResultSet, MatchError> {
        Ok(ResultSet::from(self.search_scored(query, catalog).await?))
    }

    /// [`search`](Self::search) wrapped in the response envelope.
    pub async fn search_response(
        &self,
        query: &str,
        catalog: &dyn CompanyCatalog,
    ) -> Result<SearchResponse, MatchError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(SearchResponse::empty());
        }
        let results = self.search(trimmed, catalog).await?;
        Ok(SearchResponse::new(trimmed, results))
    }

    /// Like [`search`](Self::search) but keeps the tier each record won.
    pub async fn search_scored(
        &self,
        query: &str,
        catalog: &dyn CompanyCatalog,
    ) -> Result<Vec<ScoredMatch>, MatchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let outcome = self.collect_tiers(query, catalog).await;
        let latency = started.elapsed();
        let recorder = metrics_recorder();

        match outcome {
            Ok(merged) => {
                let hits = rank(merged.into_values(), self.cfg.max_results);
                debug!(
                    query_len = query.len(),
                    hits = hits.len(),
                    latency_ms = latency.as_millis() as u64,
                    "search completed"
                );
                if let Some(recorder) = recorder {
                    recorder.record_search(latency, &hits);
                }
                Ok(hits)
            }
            Err(err) => {
                warn!(error = %err, "search aborted");
                let err = MatchError::from(err);
                if let Some(recorder) = recorder {
                    recorder.record_failure(latency, &err);
                }
                Err(err)
            }
        }
    }

    async fn collect_tiers(
        &self,
        query: &str,
        catalog: &dyn CompanyCatalog,
    ) -> Result<HashMap<String, ScoredMatch>, CatalogError> {
        let mut merged: HashMap<String, ScoredMatch> = HashMap::new();

        for tier in MatchTier::ALL {
            if tier == MatchTier::FullText && !(self.cfg.full_text && catalog.supports_full_text())
            {
                continue;
            }

            let records = match self.lookup(tier, query, catalog).await {
                Ok(records) => records,
                Err(err) if tier == MatchTier::FullText && err.is_malformed_query() => {
                    warn!(error = %err, "full-text tier skipped");
                    if let Some(recorder) = metrics_recorder() {
                        recorder.record_tier_skipped(tier);
                    }
                    continue;
                }
                Err(err) => return Err(err),
            };

            debug!(tier = tier.as_str(), candidates = records.len(), "tier evaluated");
            for record in records {
                merged
                    .entry(record.name.clone())
                    .or_insert(ScoredMatch { record, tier });
            }
        }

        Ok(merged)
    }

    async fn lookup(
        &self,
        tier: MatchTier,
        query: &str,
        catalog: &dyn CompanyCatalog,
    ) -> Result<Vec<CompanyRecord>, CatalogError> {
        match tier {
            MatchTier::Exact => catalog.exact_match(query).await,
            MatchTier::Prefix => catalog.prefix_match(query).await,
            MatchTier::Substring => catalog.substring_match(query).await,
            MatchTier::Fuzzy => Ok(catalog
                .similarity_match(query, self.cfg.similarity_threshold)
                .await?
                .into_iter()
                .map(|(record, _)| record)
                .collect()),
            MatchTier::FullText => catalog.full_text_match(query).await,
        }
    }
}

/// Sort by tier then byte-wise name, and keep the first `limit`.
fn rank(hits: impl IntoIterator<Item = ScoredMatch>, limit: usize) -> Vec<ScoredMatch> {
    let mut hits: Vec<ScoredMatch> = hits.into_iter().collect();
    hits.sort_by(|a, b| {
        a.tier
            .cmp(&b.tier)
            .then_with(|| a.record.name.cmp(&b.record.name))
    });
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests;
