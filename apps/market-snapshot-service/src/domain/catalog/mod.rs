//! Instrument Catalog
//!
//! The basket of instruments tracked by the service, grouped into four
//! asset classes. Declaration order is significant: snapshot buckets list
//! instruments in the order they appear here.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Asset class of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// Market index (e.g. S&P 500).
    Index,
    /// Individual equity.
    Stock,
    /// Commodity future.
    Commodity,
    /// Currency pair.
    Currency,
}

impl AssetClass {
    /// All asset classes in bucket order.
    pub const ALL: [Self; 4] = [Self::Index, Self::Stock, Self::Commodity, Self::Currency];

    /// Bucket name used in snapshots and catalog files.
    #[must_use]
    pub const fn bucket(&self) -> &'static str {
        match self {
            Self::Index => "indices",
            Self::Stock => "stocks",
            Self::Commodity => "commodities",
            Self::Currency => "currencies",
        }
    }
}

/// A tradable instrument tracked by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    display_name: String,
    symbol: String,
    class: AssetClass,
}

impl Instrument {
    /// Create a new instrument.
    #[must_use]
    pub fn new(display_name: impl Into<String>, symbol: impl Into<String>, class: AssetClass) -> Self {
        Self {
            display_name: display_name.into(),
            symbol: symbol.into(),
            class,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Provider ticker symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Asset class.
    #[must_use]
    pub const fn class(&self) -> AssetClass {
        self.class
    }
}

/// Ordered, immutable set of instruments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentCatalog {
    instruments: Vec<Instrument>,
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        let indices = [
            ("S&P 500", "^GSPC"),
            ("NASDAQ", "^IXIC"),
            ("Dow Jones", "^DJI"),
            ("FTSE 100", "^FTSE"),
            ("Nikkei", "^N225"),
        ];
        let stocks = ["AAPL", "GOOGL", "MSFT", "TSLA", "NVDA"];
        let commodities = [
            ("Gold", "GC=F"),
            ("Silver", "SI=F"),
            ("Crude Oil", "CL=F"),
            ("Natural Gas", "NG=F"),
            ("Copper", "HG=F"),
        ];
        let currencies = [
            ("EUR/USD", "EURUSD=X"),
            ("GBP/USD", "GBPUSD=X"),
            ("USD/JPY", "USDJPY=X"),
            ("USD/CHF", "USDCHF=X"),
        ];

        let instruments = indices
            .iter()
            .map(|(name, symbol)| Instrument::new(*name, *symbol, AssetClass::Index))
            .chain(
                stocks
                    .iter()
                    .map(|symbol| Instrument::new(*symbol, *symbol, AssetClass::Stock)),
            )
            .chain(
                commodities
                    .iter()
                    .map(|(name, symbol)| Instrument::new(*name, *symbol, AssetClass::Commodity)),
            )
            .chain(
                currencies
                    .iter()
                    .map(|(name, symbol)| Instrument::new(*name, *symbol, AssetClass::Currency)),
            )
            .collect();

        Self { instruments }
    }
}

impl InstrumentCatalog {
    /// Build a catalog from instruments, validating each entry.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the list is empty or an entry has an
    /// empty name or symbol.
    pub fn new(instruments: Vec<Instrument>) -> Result<Self, CatalogError> {
        if instruments.is_empty() {
            return Err(CatalogError::Empty);
        }
        for instrument in &instruments {
            if instrument.display_name.trim().is_empty() {
                return Err(CatalogError::EmptyName {
                    symbol: instrument.symbol.clone(),
                });
            }
            if instrument.symbol.trim().is_empty() {
                return Err(CatalogError::EmptySymbol {
                    name: instrument.display_name.clone(),
                });
            }
        }
        Ok(Self { instruments })
    }

    /// Load a catalog from a JSON file.
    ///
    /// The file holds one array per bucket, each entry `{name, symbol}`.
    /// Missing buckets are treated as empty.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read, is not valid
    /// JSON, or fails validation.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse a catalog from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on malformed JSON or invalid entries.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(raw).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let instruments = [
            (AssetClass::Index, file.indices),
            (AssetClass::Stock, file.stocks),
            (AssetClass::Commodity, file.commodities),
            (AssetClass::Currency, file.currencies),
        ]
        .into_iter()
        .flat_map(|(class, entries)| {
            entries
                .into_iter()
                .map(move |entry| Instrument::new(entry.name, entry.symbol, class))
        })
        .collect();

        Self::new(instruments)
    }

    /// All instruments in declaration order.
    #[must_use]
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Instruments of one asset class, in declaration order.
    pub fn by_class(&self, class: AssetClass) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter().filter(move |i| i.class == class)
    }

    /// Distinct ticker symbols in declaration order.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.instruments
            .iter()
            .filter(|i| seen.insert(i.symbol.as_str()))
            .map(|i| i.symbol.clone())
            .collect()
    }

    /// Number of instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Whether the catalog is empty. Always false for validated catalogs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    indices: Vec<CatalogEntry>,
    #[serde(default)]
    stocks: Vec<CatalogEntry>,
    #[serde(default)]
    commodities: Vec<CatalogEntry>,
    #[serde(default)]
    currencies: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    symbol: String,
}

/// Catalog construction error.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog has no instruments.
    #[error("instrument catalog is empty")]
    Empty,
    /// An instrument has an empty display name.
    #[error("instrument {symbol} has an empty name")]
    EmptyName {
        /// Symbol of the offending entry.
        symbol: String,
    },
    /// An instrument has an empty symbol.
    #[error("instrument {name} has an empty symbol")]
    EmptySymbol {
        /// Name of the offending entry.
        name: String,
    },
    /// Catalog file could not be read.
    #[error("failed to read catalog file {path}: {message}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        message: String,
    },
    /// Catalog file is not valid JSON.
    #[error("invalid catalog file: {0}")]
    Parse(String),
}
