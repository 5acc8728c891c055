//! Background Refresh Loop
//!
//! Recomputes the market snapshot on a fixed cadence and publishes it to
//! the shared cache. The first attempt runs immediately on start; each
//! later attempt starts `interval` after the previous one finished.
//!
//! A failed attempt is logged and leaves the cache untouched, so readers
//! keep seeing the last good snapshot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::application::services::{MarketDataError, SnapshotService};
use crate::infrastructure::cache::SharedSnapshotCache;
use crate::infrastructure::metrics::{self, RefreshOutcome};

/// Periodic snapshot refresher.
pub struct RefreshLoop {
    service: Arc<SnapshotService>,
    cache: SharedSnapshotCache,
    interval: Duration,
    cancel: CancellationToken,
}

impl RefreshLoop {
    /// Create a refresh loop.
    #[must_use]
    pub const fn new(
        service: Arc<SnapshotService>,
        cache: SharedSnapshotCache,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            service,
            cache,
            interval,
            cancel,
        }
    }

    /// Run until cancelled.
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            instruments = self.service.catalog().len(),
            "Refresh loop started"
        );

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                _ = self.refresh_once() => {}
            }

            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("Refresh loop stopped");
    }

    /// Run one refresh attempt.
    ///
    /// On success the new snapshot is published with the current time.
    ///
    /// # Errors
    ///
    /// Returns the `MarketDataError` of a failed attempt. The cache is not
    /// modified in that case.
    pub async fn refresh_once(&self) -> Result<(), MarketDataError> {
        let started = Instant::now();

        match self.service.compute().await {
            Ok(snapshot) => {
                let records = snapshot.len();
                let now = Utc::now();
                self.cache.publish(snapshot, now);
                metrics::record_refresh(RefreshOutcome::Published, started.elapsed());
                metrics::set_cache_age(Duration::ZERO);

                tracing::info!(
                    records,
                    elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    last_updated = %now.to_rfc3339(),
                    "Market snapshot refreshed"
                );
                Ok(())
            }
            Err(e) => {
                metrics::record_refresh(RefreshOutcome::Failed, started.elapsed());
                tracing::error!(
                    error = %e,
                    kind = e.kind(),
                    cache_warm = self.cache.is_warm(),
                    "Market snapshot refresh failed"
                );
                Err(e)
            }
        }
    }
}
