//! HTTP handlers and response bodies.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;
use crate::domain::snapshot::MarketSnapshot;
use crate::infrastructure::metrics::{self, RequestSource, get_metrics_handle};

const DATA_MESSAGE: &str = "Real-time market data";
const DATA_ERROR_MESSAGE: &str = "Error fetching real-time market data";

// =============================================================================
// Response Types
// =============================================================================

/// Body of `GET /api/market-data/real-time`.
#[derive(Debug, Clone, Serialize)]
pub struct MarketDataResponse {
    /// Outcome message.
    pub message: &'static str,
    /// Snapshot, or `null` on failure.
    pub data: Option<MarketSnapshot>,
    /// When the snapshot was computed. Omitted on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl MarketDataResponse {
    fn success(snapshot: MarketSnapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            message: DATA_MESSAGE,
            data: Some(snapshot),
            timestamp: Some(timestamp),
        }
    }

    const fn failure() -> Self {
        Self {
            message: DATA_ERROR_MESSAGE,
            data: None,
            timestamp: None,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests.
    pub status: &'static str,
    /// Current time.
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Serve the cached snapshot when fresh, otherwise compute one inline.
///
/// The inline result is returned to the caller only; publishing stays with
/// the refresh loop.
pub async fn real_time_handler(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<MarketDataResponse>) {
    let now = Utc::now();
    let view = state.cache.read();

    if let Some(entry) = view.entry() {
        metrics::set_cache_age(entry.age_at(now));
    }

    if let Some(entry) = view.fresh_entry(now, state.cache_duration) {
        metrics::record_request(RequestSource::Cache);
        return (
            StatusCode::OK,
            Json(MarketDataResponse::success(
                entry.snapshot.clone(),
                entry.last_updated,
            )),
        );
    }

    tracing::debug!(cache_warm = view.is_warm(), "Cache miss, computing snapshot");

    match state.service.compute().await {
        Ok(snapshot) => {
            metrics::record_request(RequestSource::Computed);
            (
                StatusCode::OK,
                Json(MarketDataResponse::success(snapshot, Utc::now())),
            )
        }
        Err(e) => {
            metrics::record_request(RequestSource::Error);
            tracing::error!(error = %e, kind = e.kind(), "Failed to compute market snapshot");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MarketDataResponse::failure()),
            )
        }
    }
}

/// Liveness check; never touches the cache or the provider.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

/// Prometheus text exposition.
pub async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}
