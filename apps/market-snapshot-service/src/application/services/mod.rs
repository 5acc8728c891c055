//! Application Services
//!
//! - `QuoteFetcher`: validates a symbol batch and makes one provider call
//! - `SnapshotService`: fetches the catalog's symbols and builds a snapshot

use std::sync::Arc;

use crate::application::ports::{FetchError, LookbackPeriod, QuoteProvider, SamplingInterval};
use crate::domain::catalog::InstrumentCatalog;
use crate::domain::series::QuoteSeries;
use crate::domain::snapshot::{MarketSnapshot, SnapshotError};

/// Error computing a market snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketDataError {
    /// Upstream provider failed or returned nothing.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Fetch was requested with no symbols.
    #[error("invalid request: symbol set is empty")]
    InvalidRequest,

    /// Fetch succeeded but nothing in it was usable.
    #[error("fetched data has no usable values for any instrument")]
    EmptyDataset,
}

impl From<SnapshotError> for MarketDataError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::EmptyDataset => Self::EmptyDataset,
        }
    }
}

impl MarketDataError {
    /// Short label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch_error",
            Self::InvalidRequest => "invalid_request",
            Self::EmptyDataset => "empty_dataset",
        }
    }
}

/// Fetches OHLC series for a symbol batch through a [`QuoteProvider`].
#[derive(Clone)]
pub struct QuoteFetcher {
    provider: Arc<dyn QuoteProvider>,
    period: LookbackPeriod,
    interval: SamplingInterval,
}

impl std::fmt::Debug for QuoteFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteFetcher")
            .field("period", &self.period)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl QuoteFetcher {
    /// Create a fetcher for a fixed lookback window.
    #[must_use]
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        period: LookbackPeriod,
        interval: SamplingInterval,
    ) -> Self {
        Self {
            provider,
            period,
            interval,
        }
    }

    /// Fetch series for `symbols`.
    ///
    /// Duplicates are dropped (first occurrence wins) before the single
    /// provider call. Symbols missing from the result are not an error.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for an empty symbol set, `Fetch` if the provider
    /// fails.
    pub async fn fetch(&self, symbols: &[String]) -> Result<QuoteSeries, MarketDataError> {
        let symbols = dedupe(symbols);
        if symbols.is_empty() {
            return Err(MarketDataError::InvalidRequest);
        }

        tracing::debug!(
            symbols = symbols.len(),
            period = self.period.as_str(),
            interval = self.interval.as_str(),
            "Fetching quote series"
        );

        let series = self
            .provider
            .fetch_series(&symbols, self.period, self.interval)
            .await?;

        tracing::debug!(
            requested = symbols.len(),
            returned = series.len(),
            "Quote series fetched"
        );
        Ok(series)
    }
}

fn dedupe(symbols: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    symbols
        .iter()
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}

/// Computes market snapshots for an instrument catalog.
#[derive(Debug, Clone)]
pub struct SnapshotService {
    catalog: Arc<InstrumentCatalog>,
    fetcher: QuoteFetcher,
}

impl SnapshotService {
    /// Create a service for `catalog`.
    #[must_use]
    pub const fn new(catalog: Arc<InstrumentCatalog>, fetcher: QuoteFetcher) -> Self {
        Self { catalog, fetcher }
    }

    /// The catalog snapshots are computed for.
    #[must_use]
    pub fn catalog(&self) -> &InstrumentCatalog {
        &self.catalog
    }

    /// Fetch the catalog's symbols and build a snapshot.
    ///
    /// # Errors
    ///
    /// Any `MarketDataError` from fetching or building.
    pub async fn compute(&self) -> Result<MarketSnapshot, MarketDataError> {
        let series = self.fetcher.fetch(&self.catalog.symbols()).await?;
        let snapshot = MarketSnapshot::build(&self.catalog, &series)?;

        tracing::debug!(
            records = snapshot.len(),
            instruments = self.catalog.len(),
            "Snapshot computed"
        );
        Ok(snapshot)
    }
}
