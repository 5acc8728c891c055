//! Yahoo Finance chart client implementing [`QuoteProvider`].
//!
//! The chart endpoint serves one symbol per request, so a batch fetch
//! issues the per-symbol requests concurrently and merges the results.
//! A symbol that fails is left out of the batch; the batch fails only
//! when no symbol succeeds.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode, Url};

use super::messages::{ChartResponse, ChartResult};
use crate::application::ports::{FetchError, LookbackPeriod, QuoteProvider, SamplingInterval};
use crate::domain::series::{QuoteSeries, SymbolSeries};
use crate::infrastructure::config::ProviderSettings;
use crate::infrastructure::metrics;

/// Upper bound on in-flight chart requests per batch.
const MAX_CONCURRENT_REQUESTS: usize = 8;

/// Browser-like agent; the chart API rejects some default client agents.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; market-snapshot-service)";

/// Yahoo Finance chart API client.
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    client: Client,
    base_url: Url,
}

impl YahooChartClient {
    /// Create a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Unreachable` if the base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url).map_err(|e| FetchError::Unreachable {
            message: format!("invalid provider URL {base_url}: {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::Unreachable {
                message: format!("provider URL {base_url} cannot be a base"),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Unreachable {
                message: e.to_string(),
            })?;

        Ok(Self { client, base_url })
    }

    /// Create a client from provider settings.
    ///
    /// # Errors
    ///
    /// See [`YahooChartClient::new`].
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, FetchError> {
        Self::new(&settings.base_url, settings.request_timeout)
    }

    fn chart_url(&self, symbol: &str) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", symbol]);
        }
        url
    }

    /// Fetch one symbol's series.
    async fn fetch_symbol(
        &self,
        symbol: &str,
        period: LookbackPeriod,
        interval: SamplingInterval,
    ) -> Result<SymbolSeries, FetchError> {
        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[("range", period.as_str()), ("interval", interval.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::Unreachable {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FetchError::Unreachable {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ChartResponse>(&body)
                .ok()
                .and_then(|r| r.chart.error)
                .map_or_else(
                    || status.canonical_reason().unwrap_or("unknown").to_string(),
                    |e| format!("{}: {}", e.code, e.description),
                );
            return Err(FetchError::UpstreamStatus {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChartResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode {
                message: e.to_string(),
            })?;

        if let Some(error) = parsed.chart.error {
            return Err(FetchError::UpstreamStatus {
                status: StatusCode::OK.as_u16(),
                message: format!("{}: {}", error.code, error.description),
            });
        }

        parsed
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(ChartResult::into_series)
            .ok_or_else(|| FetchError::Decode {
                message: format!("chart response for {symbol} has no result"),
            })
    }
}

#[async_trait]
impl QuoteProvider for YahooChartClient {
    async fn fetch_series(
        &self,
        symbols: &[String],
        period: LookbackPeriod,
        interval: SamplingInterval,
    ) -> Result<QuoteSeries, FetchError> {
        let results: Vec<(String, Result<SymbolSeries, FetchError>)> =
            futures::stream::iter(symbols.iter().cloned())
                .map(|symbol| async move {
                    let result = self.fetch_symbol(&symbol, period, interval).await;
                    (symbol, result)
                })
                .buffer_unordered(MAX_CONCURRENT_REQUESTS)
                .collect()
                .await;

        let mut series = QuoteSeries::new();
        let mut unreachable = None;
        let mut failed = 0_u64;

        for (symbol, result) in results {
            match result {
                Ok(symbol_series) => series.insert(symbol, symbol_series),
                Err(e) => {
                    failed += 1;
                    match &e {
                        FetchError::UpstreamStatus { status: 404, .. } => {
                            tracing::debug!(symbol = %symbol, error = %e, "Symbol not found upstream");
                        }
                        _ => tracing::warn!(symbol = %symbol, error = %e, "Symbol fetch failed"),
                    }
                    if matches!(e, FetchError::Unreachable { .. }) && unreachable.is_none() {
                        unreachable = Some(e);
                    }
                }
            }
        }

        metrics::record_upstream_symbols(series.len() as u64, failed);

        if series.is_empty() {
            return Err(unreachable.unwrap_or(FetchError::NoData {
                requested: symbols.len(),
            }));
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::domain::series::Field;

    fn chart_body(closes: &[Option<f64>]) -> serde_json::Value {
        let timestamps: Vec<i64> = (0..closes.len())
            .map(|i| 1_700_000_000 + i64::try_from(i).unwrap() * 86_400)
            .collect();
        json!({
            "chart": {
                "result": [{
                    "meta": {"currency": "USD"},
                    "timestamp": timestamps,
                    "indicators": {"quote": [{
                        "open": closes,
                        "high": closes,
                        "low": closes,
                        "close": closes
                    }]}
                }],
                "error": null
            }
        })
    }

    fn not_found_body() -> serde_json::Value {
        json!({"chart": {"result": null, "error": {
            "code": "Not Found",
            "description": "No data found, symbol may be delisted"
        }}})
    }

    fn client_for(server: &MockServer) -> YahooChartClient {
        YahooChartClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn fetches_each_symbol_with_window_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .and(query_param("range", "1mo"))
            .and(query_param("interval", "1d"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&[Some(1.0), Some(2.0)])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/MSFT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&[Some(3.0)])))
            .expect(1)
            .mount(&server)
            .await;

        let series = client_for(&server)
            .fetch_series(
                &symbols(&["AAPL", "MSFT"]),
                LookbackPeriod::OneMonth,
                SamplingInterval::OneDay,
            )
            .await
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.get("AAPL").unwrap().latest(Field::Close), Some(2.0));
        assert_eq!(series.get("MSFT").unwrap().latest(Field::Close), Some(3.0));
    }

    #[tokio::test]
    async fn missing_symbol_left_out_of_batch() {
        let server = MockServer::start().await;
        Mock::given(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&[Some(1.0)])))
            .mount(&server)
            .await;
        Mock::given(path("/v8/finance/chart/NOPE"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
            .mount(&server)
            .await;

        let series = client_for(&server)
            .fetch_series(
                &symbols(&["AAPL", "NOPE"]),
                LookbackPeriod::OneMonth,
                SamplingInterval::OneDay,
            )
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
        assert!(series.get("NOPE").is_none());
    }

    #[tokio::test]
    async fn all_symbols_missing_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_series(
                &symbols(&["A", "B"]),
                LookbackPeriod::OneMonth,
                SamplingInterval::OneDay,
            )
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::NoData { requested: 2 });
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .fetch_symbol("AAPL", LookbackPeriod::OneMonth, SamplingInterval::OneDay)
            .await;

        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[tokio::test]
    async fn server_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .fetch_symbol("AAPL", LookbackPeriod::OneMonth, SamplingInterval::OneDay)
            .await;

        assert!(matches!(
            result,
            Err(FetchError::UpstreamStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_provider_fails_batch() {
        let client = YahooChartClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();

        let err = client
            .fetch_series(
                &symbols(&["AAPL"]),
                LookbackPeriod::OneMonth,
                SamplingInterval::OneDay,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Unreachable { .. }));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chart_body(&[Some(1.0)]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = YahooChartClient::new(&server.uri(), Duration::from_millis(100)).unwrap();
        let err = client
            .fetch_series(
                &symbols(&["AAPL"]),
                LookbackPeriod::OneMonth,
                SamplingInterval::OneDay,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Unreachable { .. }));
    }

    #[test]
    fn chart_url_escapes_symbols() {
        let client = YahooChartClient::new("http://localhost:9000/", Duration::from_secs(1)).unwrap();
        let url = client.chart_url("^GSPC");
        assert!(url.as_str().starts_with("http://localhost:9000/v8/finance/chart/"));
        assert!(!url.path().contains("//"));
        assert!(url.path().ends_with("GSPC"));
    }

    #[test]
    fn invalid_base_url_rejected() {
        assert!(YahooChartClient::new("not a url", Duration::from_secs(1)).is_err());
    }
}
