//! HTTP API
//!
//! # Endpoints
//!
//! - `GET /api/market-data/real-time` - Latest market snapshot
//! - `GET /health` - Liveness status
//! - `GET /metrics` - Prometheus metrics in text format
//!
//! CORS is permissive on every route.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::application::services::SnapshotService;
use crate::infrastructure::cache::SharedSnapshotCache;

pub use handlers::{HealthResponse, MarketDataResponse};

/// Route of the market data endpoint.
pub const MARKET_DATA_PATH: &str = "/api/market-data/real-time";

// =============================================================================
// Server State
// =============================================================================

/// Shared state for request handlers.
pub struct AppState {
    service: Arc<SnapshotService>,
    cache: SharedSnapshotCache,
    cache_duration: Duration,
}

impl AppState {
    /// Create handler state.
    #[must_use]
    pub const fn new(
        service: Arc<SnapshotService>,
        cache: SharedSnapshotCache,
        cache_duration: Duration,
    ) -> Self {
        Self {
            service,
            cache,
            cache_duration,
        }
    }
}

/// Build the application router.
#[must_use]
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(MARKET_DATA_PATH, get(handlers::real_time_handler))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// HTTP Server
// =============================================================================

/// HTTP API server.
pub struct HttpServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    cancel: CancellationToken,
}

impl HttpServer {
    /// Create a new server.
    #[must_use]
    pub const fn new(addr: SocketAddr, state: Arc<AppState>, cancel: CancellationToken) -> Self {
        Self {
            addr,
            state,
            cancel,
        }
    }

    /// Run the server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HttpServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), HttpServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| HttpServerError::BindFailed(self.addr, e.to_string()))?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HttpServerError::ServerFailed` on a fatal server error.
    pub async fn serve(self, listener: TcpListener) -> Result<(), HttpServerError> {
        let local_addr = listener.local_addr().unwrap_or(self.addr);
        let app = create_router(self.state);

        tracing::info!(addr = %local_addr, "HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| HttpServerError::ServerFailed(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    /// Failed to bind the listen address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}
