//! Tracing subscriber setup and the Prometheus-backed match metrics.

use crate::config::ServerConfig;
use matcher::{set_match_metrics, MatchError, MatchMetrics, MatchTier, ScoredMatch};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
pub fn init_tracing(config: &ServerConfig) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_target(false);

    let installed = if config.log_format == "pretty" {
        builder.pretty().try_init()
    } else {
        builder
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Install the Prometheus recorder and route matcher metrics into it.
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    set_match_metrics(Some(Arc::new(PrometheusMatchMetrics)));
    Ok(handle)
}

/// Reports searches through the `metrics` facade.
pub struct PrometheusMatchMetrics;

impl MatchMetrics for PrometheusMatchMetrics {
    fn record_search(&self, latency: Duration, hits: &[ScoredMatch]) {
        counter!("bizsearch_searches_total").increment(1);
        histogram!("bizsearch_search_duration_seconds").record(latency.as_secs_f64());
        histogram!("bizsearch_search_results").record(hits.len() as f64);
        for tier in MatchTier::ALL {
            let won = hits.iter().filter(|hit| hit.tier == tier).count();
            if won > 0 {
                counter!("bizsearch_tier_results_total", "tier" => tier.as_str())
                    .increment(won as u64);
            }
        }
    }

    fn record_failure(&self, latency: Duration, _error: &MatchError) {
        counter!("bizsearch_search_failures_total").increment(1);
        histogram!("bizsearch_search_duration_seconds").record(latency.as_secs_f64());
    }

    fn record_tier_skipped(&self, tier: MatchTier) {
        counter!("bizsearch_tier_skipped_total", "tier" => tier.as_str()).increment(1);
    }
}
