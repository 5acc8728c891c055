//! Market Snapshot Service Binary
//!
//! Starts the refresh loop and the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin market-snapshot-service
//! ```
//!
//! # Environment Variables
//!
//! - `MARKET_HOST`: Listen address (default: 0.0.0.0)
//! - `MARKET_PORT`: Listen port (default: 5002)
//! - `MARKET_CACHE_DURATION_SECS`: Max age of a served snapshot (default: 3600)
//! - `MARKET_REFRESH_INTERVAL_SECS`: Pause between refreshes (default: cache duration)
//! - `MARKET_PROVIDER_BASE_URL`: Chart API host (default: <https://query1.finance.yahoo.com>)
//! - `MARKET_PROVIDER_TIMEOUT_SECS`: Per-request timeout (default: 30)
//! - `MARKET_LOOKBACK_PERIOD`: Fetch window (default: 1mo)
//! - `MARKET_SAMPLING_INTERVAL`: Bar size (default: 1d)
//! - `MARKET_CATALOG_PATH`: JSON instrument catalog (default: built-in basket)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: market-snapshot-service)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use market_snapshot_service::{
    AppState, HttpServer, QuoteFetcher, RefreshLoop, ServiceConfig, SnapshotCache,
    SnapshotService, YahooChartClient, init_metrics, init_telemetry,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv_from_ancestors();

    // Initialize telemetry (OpenTelemetry + tracing)
    let telemetry_guard = init_telemetry();

    tracing::info!(
        span_export = telemetry_guard.is_exporting(),
        "Starting Market Snapshot Service"
    );

    // Initialize Prometheus metrics
    let _metrics_handle = init_metrics();

    let config = ServiceConfig::from_env()?;
    log_config(&config);

    let catalog = Arc::new(config.load_catalog()?);
    tracing::info!(
        instruments = catalog.len(),
        source = config
            .catalog_path
            .as_ref()
            .map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
        "Instrument catalog loaded"
    );

    let provider = Arc::new(YahooChartClient::from_settings(&config.provider)?);
    let fetcher = QuoteFetcher::new(provider, config.provider.period, config.provider.interval);
    let service = Arc::new(SnapshotService::new(catalog, fetcher));
    let cache = Arc::new(SnapshotCache::new());

    let shutdown_token = CancellationToken::new();

    // Spawn refresh loop
    let refresh_loop = RefreshLoop::new(
        Arc::clone(&service),
        Arc::clone(&cache),
        config.cache.refresh_interval,
        shutdown_token.clone(),
    );
    let refresh_handle = tokio::spawn(refresh_loop.run());

    // Spawn HTTP server
    let state = Arc::new(AppState::new(
        Arc::clone(&service),
        Arc::clone(&cache),
        config.cache.cache_duration,
    ));
    let http_server = HttpServer::new(config.server.addr(), state, shutdown_token.clone());
    let http_shutdown = shutdown_token.clone();
    let http_handle = tokio::spawn(async move {
        if let Err(e) = http_server.run().await {
            tracing::error!(error = %e, "HTTP server error");
            http_shutdown.cancel();
        }
    });

    tracing::info!("Market snapshot service ready");

    await_shutdown(shutdown_token).await;

    let drain = async {
        let _ = refresh_handle.await;
        let _ = http_handle.await;
    };
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, drain).await.is_err() {
        tracing::warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            "Shutdown timed out, exiting"
        );
    }

    tracing::info!("Market snapshot service stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &ServiceConfig) {
    tracing::info!(
        addr = %config.server.addr(),
        cache_duration_secs = config.cache.cache_duration.as_secs(),
        refresh_interval_secs = config.cache.refresh_interval.as_secs(),
        "Configuration loaded"
    );
    tracing::debug!(
        base_url = %config.provider.base_url,
        timeout_secs = config.provider.request_timeout.as_secs(),
        period = config.provider.period.as_str(),
        interval = config.provider.interval.as_str(),
        "Provider settings"
    );
}

/// Load the nearest `.env`, searching from the working directory upwards.
///
/// Variables already set in the environment are not overridden.
fn load_dotenv_from_ancestors() {
    let Ok(cwd) = std::env::current_dir() else {
        return;
    };
    if let Some(path) = cwd
        .ancestors()
        .map(|dir| dir.join(".env"))
        .find(|path| path.is_file())
    {
        let _ = dotenvy::from_path(&path);
    }
}

/// Wait for SIGTERM, SIGINT, or an internal shutdown request.
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
        () = shutdown_token.cancelled() => {
            tracing::warn!("Internal shutdown requested");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
