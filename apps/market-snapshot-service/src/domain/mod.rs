//! Domain Layer - Instruments, quote series and snapshot derivation.
//!
//! Pure data types and the derivation rules that turn a fetched series into
//! per-asset records. No I/O happens here.

/// Instrument catalog and asset classes.
pub mod catalog;

/// Typed OHLC series returned by a fetch.
pub mod series;

/// Per-asset records and the grouped market snapshot.
pub mod snapshot;
