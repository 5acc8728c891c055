//! Yahoo Finance Adapter
//!
//! Implements the `QuoteProvider` port against the Yahoo Finance chart API.
//!
//! # Modules
//!
//! - `client`: HTTP client and batch fan-out
//! - `messages`: chart response payloads

pub mod client;
pub mod messages;

pub use client::YahooChartClient;
