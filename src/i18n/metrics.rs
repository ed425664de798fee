//! Lookup metrics for route translation.
//!
//! Counts how many path segments were found in the active bundle and how many
//! fell back to their untranslated form, so missing route keys show up in logs.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-parser lookup counters.
#[derive(Debug, Default)]
pub struct LookupMetrics {
    /// Segments resolved to a translated string
    hits: AtomicUsize,

    /// Segments with no usable entry in the bundle
    fallbacks: AtomicUsize,

    /// Completed translation passes over the route table
    passes: AtomicUsize,
}

impl LookupMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pass(&self) {
        self.passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> LookupReport {
        LookupReport::new(self.hits(), self.fallbacks(), self.passes())
    }
}

/// Snapshot of the lookup counters.
#[derive(Debug, Clone, Serialize)]
pub struct LookupReport {
    pub hits: usize,
    pub fallbacks: usize,

    /// Hit rate as a percentage (0-100)
    pub hit_rate: f64,

    pub passes: usize,
}

impl LookupReport {
    fn new(hits: usize, fallbacks: usize, passes: usize) -> Self {
        let total = hits + fallbacks;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Self {
            hits,
            fallbacks,
            hit_rate,
            passes,
        }
    }

    /// Counts recorded after `earlier` was taken from the same metrics.
    pub fn since(&self, earlier: &LookupReport) -> LookupReport {
        LookupReport::new(
            self.hits.saturating_sub(earlier.hits),
            self.fallbacks.saturating_sub(earlier.fallbacks),
            self.passes.saturating_sub(earlier.passes),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = LookupMetrics::new();
        assert_eq!(metrics.hits(), 0);
        assert_eq!(metrics.fallbacks(), 0);
        assert_eq!(metrics.passes(), 0);
    }

    #[test]
    fn test_report_empty() {
        let report = LookupMetrics::new().report();
        assert_eq!(report.hit_rate, 0.0);
        assert_eq!(report.passes, 0);
    }

    #[test]
    fn test_report_hit_rate() {
        let metrics = LookupMetrics::new();

        // 3 hits, 1 fallback = 75%
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_fallback();
        metrics.record_pass();

        let report = metrics.report();
        assert_eq!(report.hits, 3);
        assert_eq!(report.fallbacks, 1);
        assert_eq!(report.hit_rate, 75.0);
        assert_eq!(report.passes, 1);
    }

    #[test]
    fn test_report_since_counts_only_later_lookups() {
        let metrics = LookupMetrics::new();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_pass();
        let before = metrics.report();

        metrics.record_hit();
        metrics.record_fallback();
        metrics.record_pass();

        let pass = metrics.report().since(&before);
        assert_eq!(pass.hits, 1);
        assert_eq!(pass.fallbacks, 1);
        assert_eq!(pass.hit_rate, 50.0);
        assert_eq!(pass.passes, 1);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = LookupMetrics::new();
        metrics.record_fallback();

        let json = serde_json::to_value(metrics.report()).expect("Should serialize");
        assert_eq!(json["fallbacks"], 1);
        assert_eq!(json["hit_rate"], 0.0);
    }
}
