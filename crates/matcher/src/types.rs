use catalog::{CatalogError, CompanyRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Match category, best first. The derived ordering is the ranking order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact = 1,
    Prefix = 2,
    Substring = 3,
    Fuzzy = 4,
    FullText = 5,
}

impl MatchTier {
    /// Evaluation order.
    pub const ALL: [MatchTier; 5] = [
        MatchTier::Exact,
        MatchTier::Prefix,
        MatchTier::Substring,
        MatchTier::Fuzzy,
        MatchTier::FullText,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Prefix => "prefix",
            MatchTier::Substring => "substring",
            MatchTier::Fuzzy => "fuzzy",
            MatchTier::FullText => "full_text",
        }
    }
}

/// A record together with the best tier it matched in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredMatch {
    pub record: CompanyRecord,
    pub tier: MatchTier,
}

/// Final ranked, deduplicated and capped records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<CompanyRecord>,
}

impl ResultSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompanyRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[CompanyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CompanyRecord> {
        self.records
    }
}

impl From<Vec<ScoredMatch>> for ResultSet {
    fn from(hits: Vec<ScoredMatch>) -> Self {
        Self {
            records: hits.into_iter().map(|hit| hit.record).collect(),
        }
    }
}

impl IntoIterator for ResultSet {
    type Item = CompanyRecord;
    type IntoIter = std::vec::IntoIter<CompanyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Response envelope: `{"results": [...], "count": n, "query": "..."}`.
///
/// `query` is the trimmed query; `count` always equals `results.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<CompanyRecord>,
    pub count: usize,
    pub query: String,
}

impl SearchResponse {
    pub fn new(query: impl Into<String>, results: ResultSet) -> Self {
        let results = results.into_records();
        Self {
            count: results.len(),
            results,
            query: query.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(String::new(), ResultSet::empty())
    }
}

/// Ranking knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Cap on returned records; may be lowered but never above 20.
    pub max_results: usize,
    /// Fuzzy tier keeps records whose trigram similarity is strictly above this.
    pub similarity_threshold: f32,
    /// Whether the full-text tier runs at all.
    pub full_text: bool,
}

impl MatchConfig {
    pub const DEFAULT_MAX_RESULTS: usize = 20;

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.max_results == 0 {
            return Err(MatchError::InvalidConfig(
                "max_results must be greater than zero".into(),
            ));
        }
        if self.max_results > Self::DEFAULT_MAX_RESULTS {
            return Err(MatchError::InvalidConfig(format!(
                "max_results must not exceed {}",
                Self::DEFAULT_MAX_RESULTS
            )));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(MatchError::InvalidConfig(
                "similarity_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_results: Self::DEFAULT_MAX_RESULTS,
            similarity_threshold: catalog::trigram::DEFAULT_SIMILARITY_THRESHOLD,
            full_text: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// A catalog lookup failed for a reason other than a rejected full-text query.
    #[error(transparent)]
    CatalogUnavailable(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = MatchConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_results, 20);
        assert!((cfg.similarity_threshold - 0.3).abs() < f32::EPSILON);
        assert!(cfg.full_text);
    }

    #[test]
    fn zero_max_results_rejected() {
        let cfg = MatchConfig {
            max_results: 0,
            ..MatchConfig::default()
        };
        match cfg.validate() {
            Err(MatchError::InvalidConfig(msg)) => assert!(msg.contains("max_results")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn max_results_above_twenty_rejected() {
        let at_cap = MatchConfig {
            max_results: 20,
            ..MatchConfig::default()
        };
        assert!(at_cap.validate().is_ok());

        let cfg = MatchConfig {
            max_results: 21,
            ..MatchConfig::default()
        };
        match cfg.validate() {
            Err(MatchError::InvalidConfig(msg)) => assert!(msg.contains("max_results")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        for threshold in [-0.1, 1.5, f32::NAN] {
            let cfg = MatchConfig {
                similarity_threshold: threshold,
                ..MatchConfig::default()
            };
            assert!(cfg.validate().is_err(), "{threshold} accepted");
        }
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: MatchConfig = serde_json::from_str(r#"{"max_results": 5}"#).unwrap();
        assert_eq!(cfg.max_results, 5);
        assert!(cfg.full_text);
    }

    #[test]
    fn tiers_order_by_priority() {
        let mut tiers = vec![MatchTier::FullText, MatchTier::Exact, MatchTier::Fuzzy];
        tiers.sort();
        assert_eq!(tiers, vec![MatchTier::Exact, MatchTier::Fuzzy, MatchTier::FullText]);
        assert_eq!(MatchTier::FullText.as_str(), "full_text");
    }

    #[test]
    fn envelope_count_tracks_results() {
        let set = ResultSet::from(vec![ScoredMatch {
            record: CompanyRecord::new("Acme", None),
            tier: MatchTier::Exact,
        }]);
        let response = SearchResponse::new("acme", set);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["query"], "acme");
        assert_eq!(json["results"][0]["company_name"], "Acme");
        assert_eq!(json["results"][0]["website"], serde_json::Value::Null);
    }

    #[test]
    fn catalog_failures_keep_their_message() {
        let err = MatchError::from(CatalogError::Unavailable("connection refused".into()));
        assert_eq!(err.to_string(), "catalog unavailable: connection refused");
    }
}
