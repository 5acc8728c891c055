//! Quote Series
//!
//! Typed OHLC table returned by a market-data fetch:
//! `symbol -> field -> ordered values (oldest first)`, where each value may
//! be missing. A symbol or field the provider did not return is simply
//! absent from the table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// OHLC field of a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Opening price.
    Open,
    /// Session high.
    High,
    /// Session low.
    Low,
    /// Closing price.
    Close,
}

/// Series for a single symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolSeries {
    columns: HashMap<Field, Vec<Option<f64>>>,
}

impl SymbolSeries {
    /// Create an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field column. Non-finite values are stored as missing.
    #[must_use]
    pub fn with_column(mut self, field: Field, values: Vec<Option<f64>>) -> Self {
        self.insert_column(field, values);
        self
    }

    /// Insert or replace one field column. Non-finite values are stored as missing.
    pub fn insert_column(&mut self, field: Field, values: Vec<Option<f64>>) {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        self.columns.insert(field, values);
    }

    /// Raw column for a field, if the provider returned it.
    #[must_use]
    pub fn column(&self, field: Field) -> Option<&[Option<f64>]> {
        self.columns.get(&field).map(Vec::as_slice)
    }

    /// Present values of a field, most recent first.
    pub fn recent_values(&self, field: Field) -> impl Iterator<Item = f64> + '_ {
        self.column(field)
            .into_iter()
            .flat_map(|values| values.iter().rev().filter_map(|v| *v))
    }

    /// Most recent present value of a field.
    #[must_use]
    pub fn latest(&self, field: Field) -> Option<f64> {
        self.recent_values(field).next()
    }

    /// Whether any field holds at least one present value.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.columns.values().flatten().any(Option::is_some)
    }
}

/// OHLC table for a batch of symbols.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSeries {
    symbols: HashMap<String, SymbolSeries>,
}

impl QuoteSeries {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a symbol's series.
    pub fn insert(&mut self, symbol: impl Into<String>, series: SymbolSeries) {
        self.symbols.insert(symbol.into(), series);
    }

    /// Builder form of [`QuoteSeries::insert`].
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>, series: SymbolSeries) -> Self {
        self.insert(symbol, series);
        self
    }

    /// Series for a symbol, if present.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&SymbolSeries> {
        self.symbols.get(symbol)
    }

    /// Number of symbols with a series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table holds no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Whether any symbol holds at least one present value.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.symbols.values().any(SymbolSeries::has_data)
    }

    /// Symbols present in the table (unordered).
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }
}
