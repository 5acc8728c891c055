//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer, plus the runtime pieces around them.

/// Snapshot cache shared between the refresh loop and the HTTP layer.
pub mod cache;

/// Configuration loaded from the environment.
pub mod config;

/// HTTP API server.
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Background snapshot refresh.
pub mod refresh;

/// OpenTelemetry tracing integration.
pub mod telemetry;

/// Yahoo Finance chart API adapter.
pub mod yahoo;
