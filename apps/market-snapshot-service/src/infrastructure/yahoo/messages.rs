//! Yahoo Finance chart API payloads.
//!
//! Only the parts of `/v8/finance/chart/{symbol}` the service reads are
//! modelled; unknown fields (bar timestamps, volume, meta) are ignored.

use serde::Deserialize;

use crate::domain::series::{Field, SymbolSeries};

/// Top-level chart response.
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    /// Chart envelope.
    pub chart: ChartEnvelope,
}

/// Chart envelope: either results or an error.
#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    /// Results, one per requested symbol.
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    /// Provider error.
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// Provider error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    /// Error code (e.g. "Not Found").
    pub code: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

/// Series for one symbol.
#[derive(Debug, Deserialize)]
pub struct ChartResult {
    /// Indicator blocks.
    #[serde(default)]
    pub indicators: Indicators,
}

/// Indicator blocks of a chart result.
#[derive(Debug, Default, Deserialize)]
pub struct Indicators {
    /// OHLCV quote block (the API returns a one-element array).
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
}

/// OHLC columns, one entry per bar.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteBlock {
    /// Opening prices.
    #[serde(default)]
    pub open: Option<Vec<Option<f64>>>,
    /// Session highs.
    #[serde(default)]
    pub high: Option<Vec<Option<f64>>>,
    /// Session lows.
    #[serde(default)]
    pub low: Option<Vec<Option<f64>>>,
    /// Closing prices.
    #[serde(default)]
    pub close: Option<Vec<Option<f64>>>,
}

impl ChartResult {
    /// Convert into a typed series. Columns the provider omitted stay absent.
    #[must_use]
    pub fn into_series(self) -> SymbolSeries {
        let mut series = SymbolSeries::new();

        if let Some(block) = self.indicators.quote.into_iter().next() {
            for (field, column) in [
                (Field::Open, block.open),
                (Field::High, block.high),
                (Field::Low, block.low),
                (Field::Close, block.close),
            ] {
                if let Some(values) = column {
                    series.insert_column(field, values);
                }
            }
        }

        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chart_with_nulls() {
        let raw = r#"{
            "chart": {
                "result": [{
                    "meta": {"symbol": "AAPL", "currency": "USD"},
                    "timestamp": [1700000000, 1700086400, 1700172800],
                    "indicators": {
                        "quote": [{
                            "open": [1.0, 2.0, null],
                            "high": [1.5, 2.5, null],
                            "low": [0.5, 1.5, null],
                            "close": [1.2, 2.2, null],
                            "volume": [100, 200, null]
                        }],
                        "adjclose": [{"adjclose": [1.2, 2.2, null]}]
                    }
                }],
                "error": null
            }
        }"#;

        let response: ChartResponse = serde_json::from_str(raw).unwrap();
        let result = response.chart.result.unwrap().into_iter().next().unwrap();
        let series = result.into_series();

        assert_eq!(series.latest(Field::Close), Some(2.2));
        assert_eq!(series.latest(Field::High), Some(2.5));
        assert_eq!(series.column(Field::Close).map(<[_]>::len), Some(3));
    }

    #[test]
    fn empty_window_has_no_columns() {
        let raw = r#"{"chart": {"result": [{"meta": {}, "indicators": {"quote": [{}]}}], "error": null}}"#;
        let response: ChartResponse = serde_json::from_str(raw).unwrap();
        let series = response.chart.result.unwrap().remove(0).into_series();

        assert!(series.column(Field::Close).is_none());
        assert!(!series.has_data());
    }

    #[test]
    fn out_of_range_timestamps_keep_columns_whole() {
        let raw = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1700000000, 9223372036854775807, -9223372036854775808],
                    "indicators": {"quote": [{"close": [1.0, 2.0, 3.0]}]}
                }],
                "error": null
            }
        }"#;
        let response: ChartResponse = serde_json::from_str(raw).unwrap();
        let series = response.chart.result.unwrap().remove(0).into_series();

        assert_eq!(
            series.column(Field::Close),
            Some([Some(1.0), Some(2.0), Some(3.0)].as_slice())
        );
        assert_eq!(series.latest(Field::Close), Some(3.0));
    }

    #[test]
    fn parses_error_envelope() {
        let raw = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let response: ChartResponse = serde_json::from_str(raw).unwrap();

        assert!(response.chart.result.is_none());
        assert_eq!(response.chart.error.unwrap().code, "Not Found");
    }
}
