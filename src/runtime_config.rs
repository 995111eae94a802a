//! # Runtime Configuration Module
//!
//! Environment variable based configuration for the router and its logging.
//!
//! ## Environment Variables
//!
//! ### `TREEROUTE_SLOW_LOOKUP_US`
//!
//! Lookups taking longer than this many microseconds are logged at `warn`
//! with the message "Slow route matching detected". Accepts values in:
//! - Decimal: `250`
//! - Hexadecimal: `0xFA`
//!
//! Default: `1000` (1 ms)
//!
//! ### `TREEROUTE_LOG_LEVEL`
//!
//! `trace`, `debug`, `info`, `warn` or `error`. Default: `info`. `RUST_LOG`,
//! when set, takes precedence.
//!
//! ### `TREEROUTE_LOG_FORMAT`
//!
//! `json` or `pretty`. Default: `json`.
//!
//! ### `TREEROUTE_LOG_TARGET_FILTER`
//!
//! Extra comma-separated `EnvFilter` directives, e.g. `treeroute::router=debug`.
//!
//! ## Usage
//!
//! ```rust
//! use treeroute::router::Router;
//! use treeroute::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! let router = Router::with_config(config.router_config());
//! # let _ = router;
//! ```

use std::env;
use std::time::Duration;

use crate::logging::{LogConfig, LogFormat};
use crate::router::RouterConfig;

const DEFAULT_SLOW_LOOKUP_US: u64 = 1000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Slow-lookup warning threshold (default: 1000 µs)
    pub slow_lookup: Duration,
    /// Log level: trace/debug/info/warn/error (default: info)
    pub log_level: String,
    /// Log output format (default: json)
    pub log_format: LogFormat,
    /// Additional filter directives
    pub log_target_filter: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            slow_lookup: Duration::from_micros(DEFAULT_SLOW_LOOKUP_US),
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            log_target_filter: None,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let slow_lookup_us = lookup("TREEROUTE_SLOW_LOOKUP_US")
            .and_then(|val| parse_number(&val))
            .unwrap_or(DEFAULT_SLOW_LOOKUP_US);

        Self {
            slow_lookup: Duration::from_micros(slow_lookup_us),
            log_level: lookup("TREEROUTE_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format: lookup("TREEROUTE_LOG_FORMAT")
                .map_or(LogFormat::Json, |s| LogFormat::parse(&s)),
            log_target_filter: lookup("TREEROUTE_LOG_TARGET_FILTER").filter(|s| !s.trim().is_empty()),
        }
    }

    /// Router settings derived from this configuration
    #[must_use]
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            slow_lookup_threshold: self.slow_lookup,
        }
    }

    /// Logging settings derived from this configuration
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            log_level: self.log_level.clone(),
            format: self.log_format,
            target_filter: self.log_target_filter.clone(),
            include_location: false,
        }
    }
}

fn parse_number(val: &str) -> Option<u64> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}
