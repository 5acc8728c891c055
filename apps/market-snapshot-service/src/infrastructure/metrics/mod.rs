//! Prometheus Metrics Module
//!
//! Exposes service metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Refresh**: background refresh attempts, outcomes and durations
//! - **Requests**: data requests served from cache vs computed inline
//! - **Upstream**: provider symbols fetched and failed
//! - **Cache**: age of the published snapshot
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the HTTP server.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if the recorder cannot be installed.
#[allow(clippy::expect_used)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "market_snapshot_refresh_total",
        "Background refresh attempts by outcome"
    );
    describe_histogram!(
        "market_snapshot_refresh_duration_seconds",
        "Time to fetch and build a snapshot in the refresh loop"
    );
    describe_counter!(
        "market_snapshot_requests_total",
        "Data endpoint requests by how they were answered"
    );
    describe_counter!(
        "market_snapshot_upstream_symbols_total",
        "Symbols requested from the provider by outcome"
    );
    describe_gauge!(
        "market_snapshot_cache_age_seconds",
        "Age of the published snapshot when last read"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Outcome of a background refresh.
#[derive(Debug, Clone, Copy)]
pub enum RefreshOutcome {
    /// Snapshot published.
    Published,
    /// Attempt failed; cache left unchanged.
    Failed,
}

impl RefreshOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Failed => "failed",
        }
    }
}

/// How a data request was answered.
#[derive(Debug, Clone, Copy)]
pub enum RequestSource {
    /// Served from a fresh cache entry.
    Cache,
    /// Computed inline because the cache was cold or stale.
    Computed,
    /// Inline computation failed.
    Error,
}

impl RequestSource {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Computed => "computed",
            Self::Error => "error",
        }
    }
}

/// Record a background refresh attempt.
pub fn record_refresh(outcome: RefreshOutcome, duration: Duration) {
    counter!("market_snapshot_refresh_total", "outcome" => outcome.as_str()).increment(1);
    histogram!("market_snapshot_refresh_duration_seconds").record(duration.as_secs_f64());
}

/// Record how a data request was answered.
pub fn record_request(source: RequestSource) {
    counter!("market_snapshot_requests_total", "source" => source.as_str()).increment(1);
}

/// Record provider symbol outcomes for one batch.
pub fn record_upstream_symbols(fetched: u64, failed: u64) {
    counter!("market_snapshot_upstream_symbols_total", "outcome" => "fetched").increment(fetched);
    counter!("market_snapshot_upstream_symbols_total", "outcome" => "failed").increment(failed);
}

/// Update the cache age gauge.
pub fn set_cache_age(age: Duration) {
    gauge!("market_snapshot_cache_age_seconds").set(age.as_secs_f64());
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_values() {
        assert_eq!(RefreshOutcome::Published.as_str(), "published");
        assert_eq!(RefreshOutcome::Failed.as_str(), "failed");
        assert_eq!(RequestSource::Cache.as_str(), "cache");
        assert_eq!(RequestSource::Computed.as_str(), "computed");
        assert_eq!(RequestSource::Error.as_str(), "error");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_refresh(RefreshOutcome::Published, Duration::from_millis(5));
        record_request(RequestSource::Cache);
        record_upstream_symbols(3, 1);
        set_cache_age(Duration::from_secs(1));
    }
}
