//! Port Interfaces
//!
//! Contracts between the application and external systems, following the
//! hexagonal layout of the rest of the crate.
//!
//! ## Driven Ports (Outbound)
//!
//! - `QuoteProvider`: fetch OHLC series for a batch of symbols

use async_trait::async_trait;

use crate::domain::series::QuoteSeries;

/// Lookback window of a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookbackPeriod {
    /// One trading day.
    OneDay,
    /// Five trading days.
    FiveDays,
    /// One month.
    #[default]
    OneMonth,
    /// Three months.
    ThreeMonths,
    /// Six months.
    SixMonths,
    /// One year.
    OneYear,
    /// Two years.
    TwoYears,
    /// Five years.
    FiveYears,
    /// Year to date.
    YearToDate,
    /// Full history.
    Max,
}

impl LookbackPeriod {
    /// Parse a provider period code (e.g. `1mo`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let period = match s.trim().to_lowercase().as_str() {
            "1d" => Self::OneDay,
            "5d" => Self::FiveDays,
            "1mo" => Self::OneMonth,
            "3mo" => Self::ThreeMonths,
            "6mo" => Self::SixMonths,
            "1y" => Self::OneYear,
            "2y" => Self::TwoYears,
            "5y" => Self::FiveYears,
            "ytd" => Self::YearToDate,
            "max" => Self::Max,
            _ => return None,
        };
        Some(period)
    }

    /// Provider period code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::YearToDate => "ytd",
            Self::Max => "max",
        }
    }
}

/// Bar size of a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingInterval {
    /// One minute.
    OneMinute,
    /// Five minutes.
    FiveMinutes,
    /// Fifteen minutes.
    FifteenMinutes,
    /// Thirty minutes.
    ThirtyMinutes,
    /// One hour.
    OneHour,
    /// One day.
    #[default]
    OneDay,
    /// One week.
    OneWeek,
    /// One month.
    OneMonth,
}

impl SamplingInterval {
    /// Parse a provider interval code (e.g. `1d`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let interval = match s.trim().to_lowercase().as_str() {
            "1m" => Self::OneMinute,
            "5m" => Self::FiveMinutes,
            "15m" => Self::FifteenMinutes,
            "30m" => Self::ThirtyMinutes,
            "1h" | "60m" => Self::OneHour,
            "1d" => Self::OneDay,
            "1wk" => Self::OneWeek,
            "1mo" => Self::OneMonth,
            _ => return None,
        };
        Some(interval)
    }

    /// Provider interval code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
            Self::OneWeek => "1wk",
            Self::OneMonth => "1mo",
        }
    }
}

/// Market-data provider error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Provider could not be reached (connect failure, timeout).
    #[error("market data provider unreachable: {message}")]
    Unreachable {
        /// Error details.
        message: String,
    },

    /// Provider answered with a non-success status.
    #[error("market data provider returned status {status}: {message}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
        /// Error details.
        message: String,
    },

    /// Provider response could not be decoded.
    #[error("failed to decode market data response: {message}")]
    Decode {
        /// Error details.
        message: String,
    },

    /// Provider answered but returned no data for any symbol.
    #[error("market data provider returned no data for {requested} symbols")]
    NoData {
        /// Number of symbols requested.
        requested: usize,
    },
}

/// Port for fetching OHLC series from a market-data provider.
///
/// One call is one outbound request batch; implementations do not retry.
/// Symbols the provider has no data for are left out of the result rather
/// than failing the batch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch series for `symbols` over `period` sampled at `interval`.
    async fn fetch_series(
        &self,
        symbols: &[String],
        period: LookbackPeriod,
        interval: SamplingInterval,
    ) -> Result<QuoteSeries, FetchError>;
}
