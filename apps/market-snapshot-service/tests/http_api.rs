//! HTTP API Integration Tests
//!
//! Drives the router directly with a stub provider to check cache hits,
//! stale bypass, failure responses and the health endpoint.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use tower::ServiceExt;

use market_snapshot_service::{
    AppState, AssetClass, FetchError, Field, Instrument, InstrumentCatalog, LookbackPeriod,
    MarketSnapshot, QuoteFetcher, QuoteProvider, QuoteSeries, SamplingInterval, SnapshotCache,
    SnapshotService, SymbolSeries, create_router,
};

const CACHE_DURATION: Duration = Duration::from_secs(3600);

/// Provider returning a fixed result and counting calls.
struct StubProvider {
    result: Result<QuoteSeries, FetchError>,
    calls: AtomicUsize,
}

impl StubProvider {
    fn new(result: Result<QuoteSeries, FetchError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for StubProvider {
    async fn fetch_series(
        &self,
        _symbols: &[String],
        _period: LookbackPeriod,
        _interval: SamplingInterval,
    ) -> Result<QuoteSeries, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

fn catalog() -> Arc<InstrumentCatalog> {
    Arc::new(
        InstrumentCatalog::new(vec![
            Instrument::new("S&P 500", "^GSPC", AssetClass::Index),
            Instrument::new("AAPL", "AAPL", AssetClass::Stock),
            Instrument::new("Gold", "GC=F", AssetClass::Commodity),
        ])
        .unwrap(),
    )
}

fn two_day_series() -> QuoteSeries {
    QuoteSeries::new()
        .with_symbol(
            "^GSPC",
            SymbolSeries::new()
                .with_column(Field::Close, vec![Some(100.0), Some(102.0)])
                .with_column(Field::High, vec![Some(101.0), Some(103.0)])
                .with_column(Field::Low, vec![Some(99.0), Some(100.5)]),
        )
        .with_symbol(
            "AAPL",
            SymbolSeries::new().with_column(Field::Close, vec![Some(150.0)]),
        )
}

fn app(provider: Arc<StubProvider>, cache: Arc<SnapshotCache>) -> Router {
    let fetcher = QuoteFetcher::new(provider, LookbackPeriod::OneMonth, SamplingInterval::OneDay);
    let service = Arc::new(SnapshotService::new(catalog(), fetcher));
    create_router(Arc::new(AppState::new(service, cache, CACHE_DURATION)))
}

fn cached_snapshot(price: f64) -> MarketSnapshot {
    let series = QuoteSeries::new().with_symbol(
        "AAPL",
        SymbolSeries::new().with_column(Field::Close, vec![Some(price)]),
    );
    MarketSnapshot::build(&catalog(), &series).unwrap()
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn timestamp(body: &Value) -> DateTime<Utc> {
    serde_json::from_value(body["timestamp"].clone()).unwrap()
}

#[tokio::test]
async fn fresh_cache_served_without_upstream_call() {
    let provider = StubProvider::new(Ok(two_day_series()));
    let cache = Arc::new(SnapshotCache::new());
    let published = Utc::now() - TimeDelta::seconds(60);
    cache.publish(cached_snapshot(42.0), published);

    let (status, body) = get(app(Arc::clone(&provider), cache), "/api/market-data/real-time").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Real-time market data");
    assert_eq!(body["data"]["stocks"][0]["price"], 42.0);
    assert_eq!(timestamp(&body), published);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn cold_cache_computes_inline() {
    let provider = StubProvider::new(Ok(two_day_series()));
    let cache = Arc::new(SnapshotCache::new());
    let before = Utc::now();

    let (status, body) = get(
        app(Arc::clone(&provider), Arc::clone(&cache)),
        "/api/market-data/real-time",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.calls(), 1);
    assert!(timestamp(&body) >= before);

    let index = &body["data"]["indices"][0];
    assert_eq!(index["symbol"], "^GSPC");
    assert_eq!(index["name"], "S&P 500");
    assert_eq!(index["price"], 102.0);
    assert_eq!(index["change"], 2.0);
    assert_eq!(index["changePercent"], 2.0);
    assert_eq!(index["high"], 103.0);
    assert_eq!(index["low"], 100.5);
    assert_eq!(index["volume"], "N/A");
    assert_eq!(index["marketCap"], "N/A");

    let stock = &body["data"]["stocks"][0];
    assert_eq!(stock["price"], 150.0);
    assert_eq!(stock["change"], 0.0);
    assert_eq!(stock["changePercent"], 0.0);
    assert_eq!(stock["high"], 150.0);
    assert_eq!(stock["low"], 150.0);

    assert_eq!(body["data"]["commodities"], Value::Array(vec![]));
    assert_eq!(body["data"]["currencies"], Value::Array(vec![]));

    assert!(!cache.is_warm(), "inline result must not be published");
}

#[tokio::test]
async fn stale_cache_bypassed_and_left_unchanged() {
    let provider = StubProvider::new(Ok(two_day_series()));
    let cache = Arc::new(SnapshotCache::new());
    let published = Utc::now() - TimeDelta::seconds(3601);
    cache.publish(cached_snapshot(42.0), published);

    let (status, body) = get(
        app(Arc::clone(&provider), Arc::clone(&cache)),
        "/api/market-data/real-time",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.calls(), 1);
    assert_eq!(body["data"]["stocks"][0]["price"], 150.0);
    assert!(timestamp(&body) > published);

    let view = cache.read();
    assert_eq!(view.last_updated(), Some(published));
    assert_eq!(view.snapshot().unwrap().stocks[0].price, 42.0);
}

#[tokio::test]
async fn upstream_failure_returns_500_with_null_data() {
    let provider = StubProvider::new(Err(FetchError::Unreachable {
        message: "connection refused".to_string(),
    }));
    let cache = Arc::new(SnapshotCache::new());

    let (status, body) = get(app(provider, cache), "/api/market-data/real-time").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error fetching real-time market data");
    assert!(body["data"].is_null());
    assert!(body.get("timestamp").is_none());
}

#[tokio::test]
async fn unusable_data_returns_500() {
    let series = QuoteSeries::new().with_symbol(
        "AAPL",
        SymbolSeries::new().with_column(Field::High, vec![Some(1.0)]),
    );
    let provider = StubProvider::new(Ok(series));

    let (status, body) = get(
        app(provider, Arc::new(SnapshotCache::new())),
        "/api/market-data/real-time",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn health_is_independent_of_cache_and_upstream() {
    let provider = StubProvider::new(Err(FetchError::NoData { requested: 3 }));

    let (status, body) = get(
        app(Arc::clone(&provider), Arc::new(SnapshotCache::new())),
        "/health",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn cors_headers_present() {
    let provider = StubProvider::new(Ok(two_day_series()));
    let response = app(provider, Arc::new(SnapshotCache::new()))
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn unknown_route_is_404() {
    let provider = StubProvider::new(Ok(two_day_series()));
    let response = app(provider, Arc::new(SnapshotCache::new()))
        .oneshot(
            Request::builder()
                .uri("/api/market-data/historical")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
