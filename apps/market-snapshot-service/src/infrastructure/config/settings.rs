//! Service Configuration Settings
//!
//! Configuration types for the snapshot service, loaded once from
//! environment variables at startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::ports::{LookbackPeriod, SamplingInterval};
use crate::domain::catalog::{CatalogError, InstrumentCatalog};

/// Default Yahoo Finance API host.
const DEFAULT_PROVIDER_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Listen address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5002,
        }
    }
}

impl ServerSettings {
    /// Socket address to bind.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Cache freshness and refresh cadence.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Age below which a cached snapshot is served as-is.
    pub cache_duration: Duration,
    /// Pause between the end of one refresh and the start of the next.
    pub refresh_interval: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cache_duration: Duration::from_secs(3600),
            refresh_interval: Duration::from_secs(3600),
        }
    }
}

/// Market-data provider settings.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Provider API base URL.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Lookback window of each fetch.
    pub period: LookbackPeriod,
    /// Bar size of each fetch.
    pub interval: SamplingInterval,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            period: LookbackPeriod::default(),
            interval: SamplingInterval::default(),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    pub server: ServerSettings,
    /// Cache settings.
    pub cache: CacheSettings,
    /// Provider settings.
    pub provider: ProviderSettings,
    /// Optional JSON catalog replacing the built-in basket.
    pub catalog_path: Option<PathBuf>,
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults; set keys must parse.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server = ServerSettings {
            host: parse_or(get("MARKET_HOST"), "MARKET_HOST", defaults.server.host)?,
            port: parse_or(get("MARKET_PORT"), "MARKET_PORT", defaults.server.port)?,
        };

        let cache_duration = parse_secs_or(
            get("MARKET_CACHE_DURATION_SECS"),
            "MARKET_CACHE_DURATION_SECS",
            defaults.cache.cache_duration,
        )?;
        // Refresh cadence follows the cache duration unless set separately.
        let refresh_interval = parse_secs_or(
            get("MARKET_REFRESH_INTERVAL_SECS"),
            "MARKET_REFRESH_INTERVAL_SECS",
            cache_duration,
        )?;
        if refresh_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "MARKET_REFRESH_INTERVAL_SECS".to_string(),
                value: "0".to_string(),
            });
        }

        let period = match get("MARKET_LOOKBACK_PERIOD") {
            Some(raw) => LookbackPeriod::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "MARKET_LOOKBACK_PERIOD".to_string(),
                value: raw,
            })?,
            None => defaults.provider.period,
        };

        let interval = match get("MARKET_SAMPLING_INTERVAL") {
            Some(raw) => SamplingInterval::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "MARKET_SAMPLING_INTERVAL".to_string(),
                value: raw,
            })?,
            None => defaults.provider.interval,
        };

        let request_timeout = parse_secs_or(
            get("MARKET_PROVIDER_TIMEOUT_SECS"),
            "MARKET_PROVIDER_TIMEOUT_SECS",
            defaults.provider.request_timeout,
        )?;
        // A zero timeout fails every upstream request.
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "MARKET_PROVIDER_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
            });
        }

        let provider = ProviderSettings {
            base_url: get("MARKET_PROVIDER_BASE_URL")
                .map_or(defaults.provider.base_url, |url| {
                    url.trim_end_matches('/').to_string()
                }),
            request_timeout,
            period,
            interval,
        };

        Ok(Self {
            server,
            cache: CacheSettings {
                cache_duration,
                refresh_interval,
            },
            provider,
            catalog_path: get("MARKET_CATALOG_PATH").map(PathBuf::from),
        })
    }

    /// Load the instrument catalog: the configured file, or the built-in basket.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the configured file is unreadable or invalid.
    pub fn load_catalog(&self) -> Result<InstrumentCatalog, CatalogError> {
        self.catalog_path
            .as_deref()
            .map_or_else(|| Ok(InstrumentCatalog::default()), InstrumentCatalog::from_json_file)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable holds a value that cannot be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    raw.map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            })
    })
}

fn parse_secs_or(
    raw: Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    parse_or(raw, key, default.as_secs()).map(Duration::from_secs)
}
