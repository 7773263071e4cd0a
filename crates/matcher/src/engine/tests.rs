use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use catalog::IndexedCatalog;

use crate::metrics::{set_match_metrics, MatchMetrics};

/// Indexed catalog wrapper that counts calls and can fail chosen lookups.
struct ScriptedCatalog {
    inner: IndexedCatalog,
    calls: Mutex<Vec<&'static str>>,
    fail_on: Option<(&'static str, CatalogError)>,
    full_text: bool,
}

impl ScriptedCatalog {
    fn new(names: &[&str]) -> Self {
        let records = names.iter().map(|name| CompanyRecord::new(*name, None));
        Self {
            inner: IndexedCatalog::from_records(records).unwrap(),
            calls: Mutex::new(Vec::new()),
            fail_on: None,
            full_text: true,
        }
    }

    fn failing(mut self, lookup: &'static str, err: CatalogError) -> Self {
        self.fail_on = Some((lookup, err));
        self
    }

    fn without_full_text(mut self) -> Self {
        self.full_text = false;
        self
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, lookup: &'static str) -> Result<(), CatalogError> {
        self.calls.lock().unwrap().push(lookup);
        match &self.fail_on {
            Some((failing, err)) if *failing == lookup => Err(err.clone()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CompanyCatalog for ScriptedCatalog {
    async fn exact_match(&self, name: &str) -> Result<Vec<CompanyRecord>, CatalogError> {
        self.enter("exact")?;
        self.inner.exact_match(name).await
    }

    async fn prefix_match(&self, name: &str) -> Result<Vec<CompanyRecord>, CatalogError> {
        self.enter("prefix")?;
        self.inner.prefix_match(name).await
    }

    async fn substring_match(&self, name: &str) -> Result<Vec<CompanyRecord>, CatalogError> {
        self.enter("substring")?;
        self.inner.substring_match(name).await
    }

    async fn similarity_match(
        &self,
        name: &str,
        threshold: f32,
    ) -> Result<Vec<(CompanyRecord, f32)>, CatalogError> {
        self.enter("similarity")?;
        self.inner.similarity_match(name, threshold).await
    }

    async fn full_text_match(&self, query: &str) -> Result<Vec<CompanyRecord>, CatalogError> {
        self.enter("full_text")?;
        self.inner.full_text_match(query).await
    }

    async fn count(&self) -> Result<usize, CatalogError> {
        self.enter("count")?;
        self.inner.count().await
    }

    fn supports_full_text(&self) -> bool {
        self.full_text
    }
}

fn names(set: &ResultSet) -> Vec<&str> {
    set.iter().map(|r| r.name.as_str()).collect()
}

#[tokio::test]
async fn blank_queries_never_reach_the_catalog() {
    let catalog = ScriptedCatalog::new(&["Acme Corp"]);
    let matcher = RankedMatcher::default();

    for query in ["", "   ", "\t\n "] {
        assert!(matcher.search(query, &catalog).await.unwrap().is_empty());
        let response = matcher.search_response(query, &catalog).await.unwrap();
        assert_eq!(response, SearchResponse::empty());
    }
    assert!(catalog.calls().is_empty());
}

#[tokio::test]
async fn prefix_matches_precede_weaker_ones() {
    let catalog = ScriptedCatalog::new(&["Acme Corp", "Acme Industries", "Ace Co"]);
    let results = RankedMatcher::default()
        .search("acme", &catalog)
        .await
        .unwrap();

    let found = names(&results);
    assert_eq!(&found[..2], &["Acme Corp", "Acme Industries"]);
    if let Some(pos) = found.iter().position(|name| *name == "Ace Co") {
        assert!(pos >= 2);
    }
}

#[tokio::test]
async fn tiers_rank_before_names() {
    let catalog = ScriptedCatalog::new(&["Zeta Acme", "Acme Holdings", "ACME", "Acme"]);
    let results = RankedMatcher::default()
        .search("acme", &catalog)
        .await
        .unwrap();

    assert_eq!(
        names(&results),
        vec!["ACME", "Acme", "Acme Holdings", "Zeta Acme"]
    );
}

#[tokio::test]
async fn each_record_keeps_its_best_tier() {
    let catalog = ScriptedCatalog::new(&[
        "Widget",
        "Widgets Inc",
        "Blue Widget Co",
        "Widgit",
        "Acme Global Industry Holdings Group International",
    ]);
    let matcher = RankedMatcher::default();

    let hits = matcher.search_scored("widget", &catalog).await.unwrap();
    let tiers: Vec<(&str, MatchTier)> = hits
        .iter()
        .map(|hit| (hit.record.name.as_str(), hit.tier))
        .collect();
    assert_eq!(
        tiers,
        vec![
            ("Widget", MatchTier::Exact),
            ("Widgets Inc", MatchTier::Prefix),
            ("Blue Widget Co", MatchTier::Substring),
            ("Widgit", MatchTier::Fuzzy),
        ]
    );

    let hits = matcher
        .search_scored("acme industries", &catalog)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].tier, MatchTier::FullText);
}

#[tokio::test]
async fn same_name_is_reported_once() {
    let catalog = IndexedCatalog::from_records(vec![
        CompanyRecord::new("Acme Corp", Some("b.example")),
        CompanyRecord::new("Acme Corp", Some("a.example")),
        CompanyRecord::new("Acme Corporation", None),
    ])
    .unwrap();

    let results = RankedMatcher::default()
        .search("acme corp", &catalog)
        .await
        .unwrap();
    assert_eq!(names(&results), vec!["Acme Corp", "Acme Corporation"]);
    assert_eq!(results.as_slice()[0].website.as_deref(), Some("a.example"));
}

#[tokio::test]
async fn results_are_capped_after_sorting() {
    let names_owned: Vec<String> = (0..50).rev().map(|i| format!("Company {i:02}")).collect();
    let refs: Vec<&str> = names_owned.iter().map(String::as_str).collect();
    let catalog = ScriptedCatalog::new(&refs);

    let results = RankedMatcher::default()
        .search("company", &catalog)
        .await
        .unwrap();
    assert_eq!(results.len(), 20);
    assert_eq!(results.as_slice()[0].name, "Company 00");
    assert_eq!(results.as_slice()[19].name, "Company 19");
}

#[tokio::test]
async fn custom_cap_is_honored() {
    let catalog = ScriptedCatalog::new(&["Acme A", "Acme B", "Acme C"]);
    let matcher = RankedMatcher::new(MatchConfig {
        max_results: 2,
        ..MatchConfig::default()
    })
    .unwrap();
    let results = matcher.search("acme", &catalog).await.unwrap();
    assert_eq!(names(&results), vec!["Acme A", "Acme B"]);
}

#[tokio::test]
async fn catalog_failure_aborts_without_partial_results() {
    let catalog = ScriptedCatalog::new(&["Acme Corp"])
        .failing("prefix", CatalogError::Unavailable("connection reset".into()));

    let err = RankedMatcher::default()
        .search("acme", &catalog)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MatchError::CatalogUnavailable(CatalogError::Unavailable(_))
    ));
    assert_eq!(catalog.calls(), vec!["exact", "prefix"]);
}

#[tokio::test]
async fn rejected_full_text_query_only_skips_that_tier() {
    let catalog = ScriptedCatalog::new(&["Acme Corp", "Acme Industries"]).failing(
        "full_text",
        CatalogError::MalformedFullTextQuery("syntax error in tsquery".into()),
    );

    let results = RankedMatcher::default()
        .search("acme", &catalog)
        .await
        .unwrap();
    assert_eq!(names(&results), vec!["Acme Corp", "Acme Industries"]);
    assert_eq!(catalog.calls().last(), Some(&"full_text"));
}

#[tokio::test]
async fn stop_word_query_still_returns_pattern_matches() {
    let catalog = ScriptedCatalog::new(&["The Home Depot", "Other Co"]);
    let hits = RankedMatcher::default()
        .search_scored("the", &catalog)
        .await
        .unwrap();
    assert_eq!(hits[0].record.name, "The Home Depot");
    assert_eq!(hits[0].tier, MatchTier::Prefix);
}

#[tokio::test]
async fn other_full_text_failures_are_fatal() {
    let catalog = ScriptedCatalog::new(&["Acme Corp"])
        .failing("full_text", CatalogError::Unavailable("timeout".into()));
    assert!(RankedMatcher::default()
        .search("acme", &catalog)
        .await
        .is_err());
}

#[tokio::test]
async fn full_text_tier_can_be_disabled_either_side() {
    let catalog = ScriptedCatalog::new(&["Acme Corp"]).without_full_text();
    RankedMatcher::default()
        .search("acme", &catalog)
        .await
        .unwrap();
    assert!(!catalog.calls().contains(&"full_text"));

    let catalog = ScriptedCatalog::new(&["Acme Corp"]);
    let matcher = RankedMatcher::new(MatchConfig {
        full_text: false,
        ..MatchConfig::default()
    })
    .unwrap();
    matcher.search("acme", &catalog).await.unwrap();
    assert!(!catalog.calls().contains(&"full_text"));
}

#[tokio::test]
async fn repeated_searches_are_identical() {
    let catalog = ScriptedCatalog::new(&["Acme Corp", "Acme Industries", "Acne Labs", "Macme"]);
    let matcher = RankedMatcher::default();
    let first = matcher.search("acme", &catalog).await.unwrap();
    for _ in 0..5 {
        assert_eq!(matcher.search("acme", &catalog).await.unwrap(), first);
    }
}

#[tokio::test]
async fn response_echoes_trimmed_query() {
    let catalog = ScriptedCatalog::new(&["Acme Corp"]);
    let response = RankedMatcher::default()
        .search_response("  Acme \n", &catalog)
        .await
        .unwrap();
    assert_eq!(response.query, "Acme");
    assert_eq!(response.count, response.results.len());
    assert_eq!(response.count, 1);
}

#[tokio::test]
async fn empty_catalog_and_long_queries_are_fine() {
    let catalog = ScriptedCatalog::new(&[]);
    let long_query = "x".repeat(10_000);
    let matcher = RankedMatcher::default();
    assert!(matcher.search("acme", &catalog).await.unwrap().is_empty());
    assert!(matcher.search(&long_query, &catalog).await.unwrap().is_empty());
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let err = RankedMatcher::new(MatchConfig {
        similarity_threshold: 2.0,
        ..MatchConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, MatchError::InvalidConfig(_)));
}

#[test]
fn cap_cannot_be_raised_past_twenty() {
    let err = RankedMatcher::new(MatchConfig {
        max_results: 50,
        ..MatchConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, MatchError::InvalidConfig(msg) if msg.contains("max_results")));
}

#[derive(Default)]
struct CountingMetrics {
    searches: AtomicUsize,
    failures: AtomicUsize,
}

impl MatchMetrics for CountingMetrics {
    fn record_search(&self, _latency: Duration, _hits: &[ScoredMatch]) {
        self.searches.fetch_add(1, Ordering::SeqCst);
    }

    fn record_failure(&self, _latency: Duration, _error: &MatchError) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn metrics_hook_sees_successes_and_failures() {
    let metrics = Arc::new(CountingMetrics::default());
    set_match_metrics(Some(metrics.clone() as Arc<dyn MatchMetrics>));

    let ok = ScriptedCatalog::new(&["Acme Corp"]);
    let broken = ScriptedCatalog::new(&["Acme Corp"])
        .failing("exact", CatalogError::Unavailable("down".into()));
    let matcher = RankedMatcher::default();
    matcher.search("acme", &ok).await.unwrap();
    let _ = matcher.search("acme", &broken).await;

    set_match_metrics(None);
    assert!(metrics.searches.load(Ordering::SeqCst) >= 1);
    assert!(metrics.failures.load(Ordering::SeqCst) >= 1);
}
