// Metrics hooks for the `matcher` crate.
//
// A service installs one global `MatchMetrics` implementation via
// [`set_match_metrics`]; every `RankedMatcher` then reports latency, result
// counts per tier and failures to it.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::types::{MatchError, MatchTier, ScoredMatch};

/// Metrics observer for searches.
pub trait MatchMetrics: Send + Sync {
    /// A search completed; `hits` is the final ranked list.
    fn record_search(&self, latency: Duration, hits: &[ScoredMatch]);

    /// A search aborted with `error`.
    fn record_failure(&self, latency: Duration, error: &MatchError) {
        let _ = (latency, error);
    }

    /// A tier was skipped because its query was rejected.
    fn record_tier_skipped(&self, tier: MatchTier) {
        let _ = tier;
    }
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Install or clear the global recorder.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    *metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = recorder;
}
