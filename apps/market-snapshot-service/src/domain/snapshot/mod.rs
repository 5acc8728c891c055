//! Market Snapshot
//!
//! Per-asset records derived from a [`QuoteSeries`] and grouped into the
//! four catalog buckets.
//!
//! # Derivation
//!
//! For each instrument with at least one present close:
//!
//! - `price`: most recent close
//! - `previous_close`: second most recent close, or `price` when only one exists
//! - `change`: `price - previous_close`
//! - `change_percent`: `change / previous_close * 100`, or `0` when `previous_close == 0`
//!   or the quotient is not finite
//! - `high` / `low`: most recent high / low, falling back to `price`
//!
//! Instruments without a close, or whose change overflows, are left out of
//! their bucket.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{AssetClass, Instrument, InstrumentCatalog};
use crate::domain::series::{Field, QuoteSeries, SymbolSeries};

/// Normalized record for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSnapshot {
    /// Provider ticker symbol.
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Latest close.
    pub price: f64,
    /// Close before the latest one.
    pub previous_close: f64,
    /// Absolute change from the previous close.
    pub change: f64,
    /// Percent change from the previous close.
    pub change_percent: f64,
    /// Latest session high.
    pub high: f64,
    /// Latest session low.
    pub low: f64,
    /// Session volume. Not supplied by the chart source.
    #[serde(with = "not_available")]
    pub volume: Option<u64>,
    /// Market capitalization. Not supplied by the chart source.
    #[serde(with = "not_available")]
    pub market_cap: Option<f64>,
}

impl AssetSnapshot {
    /// Derive a record for `instrument` from its series.
    ///
    /// Returns `None` when the series has no present close or the change
    /// is not representable as a finite number.
    #[must_use]
    pub fn derive(instrument: &Instrument, series: &SymbolSeries) -> Option<Self> {
        let mut closes = series.recent_values(Field::Close);
        let price = closes.next()?;
        let previous_close = closes.next().unwrap_or(price);

        let change = price - previous_close;
        if !change.is_finite() {
            return None;
        }
        let change_percent = if previous_close == 0.0 {
            0.0
        } else {
            // Subnormal previous closes overflow the quotient.
            Some(change / previous_close * 100.0)
                .filter(|p| p.is_finite())
                .unwrap_or(0.0)
        };

        Some(Self {
            symbol: instrument.symbol().to_string(),
            name: instrument.display_name().to_string(),
            price,
            previous_close,
            change,
            change_percent,
            high: series.latest(Field::High).unwrap_or(price),
            low: series.latest(Field::Low).unwrap_or(price),
            volume: None,
            market_cap: None,
        })
    }
}

/// Snapshot of every catalog bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Market indices.
    pub indices: Vec<AssetSnapshot>,
    /// Individual stocks.
    pub stocks: Vec<AssetSnapshot>,
    /// Commodities.
    pub commodities: Vec<AssetSnapshot>,
    /// Currency pairs.
    pub currencies: Vec<AssetSnapshot>,
}

impl MarketSnapshot {
    /// Build a snapshot for `catalog` from a fetched series.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::EmptyDataset` when no instrument yields a
    /// record. A partially populated snapshot is not an error.
    pub fn build(catalog: &InstrumentCatalog, series: &QuoteSeries) -> Result<Self, SnapshotError> {
        let mut snapshot = Self::default();

        for class in AssetClass::ALL {
            for instrument in catalog.by_class(class) {
                let Some(record) = series
                    .get(instrument.symbol())
                    .and_then(|s| AssetSnapshot::derive(instrument, s))
                else {
                    tracing::debug!(
                        symbol = instrument.symbol(),
                        bucket = class.bucket(),
                        "No usable close data, skipping"
                    );
                    continue;
                };
                snapshot.bucket_mut(class).push(record);
            }
        }

        if snapshot.is_empty() {
            return Err(SnapshotError::EmptyDataset);
        }
        Ok(snapshot)
    }

    /// Records of one asset class.
    #[must_use]
    pub fn bucket(&self, class: AssetClass) -> &[AssetSnapshot] {
        match class {
            AssetClass::Index => &self.indices,
            AssetClass::Stock => &self.stocks,
            AssetClass::Commodity => &self.commodities,
            AssetClass::Currency => &self.currencies,
        }
    }

    fn bucket_mut(&mut self, class: AssetClass) -> &mut Vec<AssetSnapshot> {
        match class {
            AssetClass::Index => &mut self.indices,
            AssetClass::Stock => &mut self.stocks,
            AssetClass::Commodity => &mut self.commodities,
            AssetClass::Currency => &mut self.currencies,
        }
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        AssetClass::ALL.iter().map(|c| self.bucket(*c).len()).sum()
    }

    /// Whether every bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Snapshot construction error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// The fetch returned no usable close for any instrument.
    #[error("fetched data has no usable values for any instrument")]
    EmptyDataset,
}

/// Serde adapter writing `None` as the `"N/A"` marker instead of a number.
mod not_available {
    use serde::de::{self, DeserializeOwned};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    const MARKER: &str = "N/A";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Value(T),
        Marker(String),
    }

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_str(MARKER),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: DeserializeOwned,
        D: Deserializer<'de>,
    {
        match Raw::<T>::deserialize(deserializer)? {
            Raw::Value(v) => Ok(Some(v)),
            Raw::Marker(s) if s == MARKER => Ok(None),
            Raw::Marker(s) => Err(de::Error::custom(format!(
                "expected a number or \"{MARKER}\", got \"{s}\""
            ))),
        }
    }
}
