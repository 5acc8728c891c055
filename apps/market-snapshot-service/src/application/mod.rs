//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the application services and the port interfaces
//! that define how the domain reaches external systems.

/// Port interfaces for external systems (market-data provider).
pub mod ports;

/// Application services for fetching quotes and computing snapshots.
pub mod services;
