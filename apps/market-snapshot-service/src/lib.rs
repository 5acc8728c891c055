#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Market Snapshot Service - Cached Multi-Asset Quotes
//!
//! An HTTP service that periodically pulls daily OHLC series for a fixed
//! basket of indices, stocks, commodities and currency pairs, derives a
//! normalized per-asset record for each, and serves the latest snapshot
//! from an in-memory cache.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core types with no I/O
//!   - `catalog`: Instruments grouped by asset class
//!   - `series`: Typed OHLC series per symbol
//!   - `snapshot`: Per-asset records and the grouped snapshot
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: `QuoteProvider` interface
//!   - `services`: Quote fetching and snapshot computation
//!
//! - **Infrastructure**: Adapters and runtime
//!   - `yahoo`: Yahoo Finance chart client
//!   - `cache`: Latest snapshot plus timestamp
//!   - `refresh`: Background refresh loop
//!   - `http`: Data, health and metrics endpoints
//!   - `config`: Environment configuration
//!
//! # Data Flow
//!
//! ```text
//! Refresh Loop ──► Quote Fetcher ──► Snapshot Builder ──► Cache
//!                        ▲                                  │
//!                        │ (stale or cold)                  ▼
//!                        └────────────── HTTP Layer ◄─── GET /api/market-data/real-time
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core market types with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::catalog::{AssetClass, CatalogError, Instrument, InstrumentCatalog};
pub use domain::series::{Field, QuoteSeries, SymbolSeries};
pub use domain::snapshot::{AssetSnapshot, MarketSnapshot};

// Ports and services
pub use application::ports::{FetchError, LookbackPeriod, QuoteProvider, SamplingInterval};
pub use application::services::{MarketDataError, QuoteFetcher, SnapshotService};

// Infrastructure
pub use infrastructure::cache::{CacheView, CachedSnapshot, SharedSnapshotCache, SnapshotCache};
pub use infrastructure::config::{
    CacheSettings, ConfigError, ProviderSettings, ServerSettings, ServiceConfig,
};
pub use infrastructure::http::{AppState, HttpServer, HttpServerError, create_router};
pub use infrastructure::refresh::RefreshLoop;
pub use infrastructure::yahoo::YahooChartClient;

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
