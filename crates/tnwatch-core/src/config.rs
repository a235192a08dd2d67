//! Configuration management for tnwatch
//!
//! Defaults reproduce the values the tool has always shipped with. They are
//! layered with an optional TOML file and `TNWATCH__SECTION__KEY`
//! environment overrides.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "TNWATCH";

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network client configuration
    pub network: NetworkConfig,

    /// Stream selection
    pub stream: StreamConfig,

    /// Record post-processing
    pub fetch: FetchConfig,

    /// Alerting configuration
    pub alerting: AlertingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration: defaults, then the optional file, then environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())?;

        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants the type system cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.stream.date_from > self.stream.date_to {
            return Err(Error::InvalidDateRange(format!(
                "{} is after {}",
                self.stream.date_from, self.stream.date_to
            )));
        }
        if let Some(factor) = self.fetch.scale_factor {
            if !factor.is_finite() {
                return Err(Error::config("fetch.scale_factor must be finite"));
            }
        }
        if !self.alerting.threshold.is_finite() {
            return Err(Error::config("alerting.threshold must be finite"));
        }
        Ok(())
    }
}

/// Network client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Gateway endpoint
    pub endpoint: String,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Retries after the first failed attempt. Zero keeps fail-fast behaviour.
    pub max_retries: u32,
    /// Initial backoff between retries, doubled on each attempt
    #[serde(with = "humantime_serde")]
    pub retry_base_delay: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://staging.tsn.truflation.com".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 0,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

/// Stream selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Stream id, or a stream name to derive the id from
    pub stream_id: String,
    /// Data provider address
    pub provider: String,
    /// First date of the range (inclusive)
    pub date_from: NaiveDate,
    /// Last date of the range (inclusive)
    pub date_to: NaiveDate,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            stream_id: "stf37ad83c0b92c7419925b7633c0e62".to_string(),
            provider: "0x4710a8d8f0d845da110086812a32de6d90d7ff5c".to_string(),
            date_from: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            date_to: NaiveDate::from_ymd_opt(2023, 1, 31).unwrap_or_default(),
        }
    }
}

/// Record post-processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Multiplier applied to every surviving value. `None` leaves values as-is.
    pub scale_factor: Option<f64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            scale_factor: Some(1e18),
        }
    }
}

/// Alerting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertingConfig {
    /// The mean must strictly exceed this to trigger
    pub threshold: f64,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self { threshold: 1000.0 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
