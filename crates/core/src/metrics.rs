//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Mission runs (outcomes, duration, findings)
//! - Narrative summaries (LLM calls, tokens, fallbacks)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Mission Metrics
// =============================================================================

/// Finished missions by type and terminal status.
pub static MISSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("fleetsafe_missions_total", "Total missions finished"),
        &["type", "status"], // status: "complete", "failed", "cancelled"
    )
    .unwrap()
});

/// Mission wall-clock duration in seconds.
pub static MISSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "fleetsafe_mission_duration_seconds",
            "Duration of mission runs",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 90.0]),
        &["type", "status"],
    )
    .unwrap()
});

/// Findings emitted by severity.
pub static FINDINGS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("fleetsafe_findings_total", "Total mission findings emitted"),
        &["type", "severity"],
    )
    .unwrap()
});

// =============================================================================
// Summary Metrics
// =============================================================================

/// Templated summaries used in place of a narrative.
pub static SUMMARY_FALLBACKS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "fleetsafe_summary_fallbacks_total",
            "Missions that fell back to a templated summary",
        ),
        &["reason"], // "error", "timeout"
    )
    .unwrap()
});

/// LLM completion requests by provider and result.
pub static LLM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("fleetsafe_llm_requests_total", "Total LLM completion requests"),
        &["provider", "result"],
    )
    .unwrap()
});

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("fleetsafe_llm_tokens_total", "Total LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Missions
        Box::new(MISSIONS_TOTAL.clone()),
        Box::new(MISSION_DURATION.clone()),
        Box::new(FINDINGS_TOTAL.clone()),
        // Summaries
        Box::new(SUMMARY_FALLBACKS.clone()),
        Box::new(LLM_REQUESTS.clone()),
        Box::new(LLM_TOKENS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        MISSIONS_TOTAL
            .with_label_values(&["wellness_check", "complete"])
            .inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|f| f.get_name().to_string())
            .collect();
        assert!(names.contains(&"fleetsafe_missions_total".to_string()));
    }
}
