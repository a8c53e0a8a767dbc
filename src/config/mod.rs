//! Configuration management for revenue attestation
//!
//! This module handles loading, validating, and providing access to the
//! application configuration. It supports loading configuration from TOML
//! files, environment variable overrides, and programmatic construction.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod types;
pub mod validation;

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod validation_tests;

#[cfg(test)]
#[path = "tests/config_mod_tests.rs"]
mod config_mod_tests;

use std::{
    env,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use directories::ProjectDirs;

use serde::{Deserialize, Serialize};

use crate::core::LeafEncoding;
use crate::revenue::{AnomalyThresholds, DatePolicy, Normalizer, PeriodAggregator, DEFAULT_CURRENCY};
use crate::LogLevel;

/// Re-export the error type
pub use error::ConfigError;
pub use types::LedgerMode;

/// The environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "RA_";

/// The application name used for finding config directories
const APP_NAME: &str = "revenue-attest";

/// Default RPC endpoint for the ledger gateway.
pub const DEFAULT_RPC_URL: &str = "https://soroban-testnet.stellar.org";

/// Default network passphrase (Stellar testnet).
pub const DEFAULT_NETWORK_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Main configuration structure.
///
/// # Example
///
/// ```no_run
/// use revenue_attest::config::Config;
///
/// // A path that does not exist falls back to defaults.
/// let config = Config::load("path/that/hopefully/does/not/exist.toml").unwrap();
/// assert_eq!(config.idempotency.ttl_seconds, 86_400);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Ledger client configuration
    pub ledger: LedgerConfig,

    /// Revenue normalization configuration
    pub normalization: NormalizationConfig,

    /// Commitment (leaf encoding) configuration
    pub commitment: CommitmentConfig,

    /// Anomaly detection thresholds
    pub anomaly: AnomalyThresholds,

    /// Idempotency cache configuration
    pub idempotency: IdempotencyConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Whether to log to the console (stderr)
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: true,
        }
    }
}

/// Ledger client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Which client implementation to use
    pub mode: LedgerMode,
    /// JSON-RPC endpoint (rpc mode only)
    pub rpc_url: String,
    /// Attestation contract address, `C...` strkey (rpc mode only)
    pub contract_id: String,
    /// Network passphrase of the ledger
    pub network_passphrase: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mode: LedgerMode::Simulated,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_id: String::new(),
            network_passphrase: DEFAULT_NETWORK_PASSPHRASE.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Revenue normalization configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// What to do with rows whose date is missing or unparseable
    pub date_policy: DatePolicy,
    /// Currency assumed for rows that carry none
    pub default_currency: String,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            date_policy: DatePolicy::FallbackToNow,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Commitment configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitmentConfig {
    /// Canonical leaf encoding version
    pub leaf_encoding: LeafEncoding,
}

/// Idempotency cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdempotencyConfig {
    /// How long a stored response is replayed, in seconds
    pub ttl_seconds: u64,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self { ttl_seconds: 24 * 60 * 60 }
    }
}

impl IdempotencyConfig {
    /// The TTL as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for Config {
    /// Creates a default configuration: simulated ledger, lossy date
    /// fallback, `v1` leaves, 24 hour idempotency window.
    fn default() -> Self {
        Config {
            logging: LoggingConfig::default(),
            ledger: LedgerConfig::default(),
            normalization: NormalizationConfig::default(),
            commitment: CommitmentConfig::default(),
            anomaly: AnomalyThresholds::default(),
            idempotency: IdempotencyConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from the specified path.
    ///
    /// A missing file falls back to built-in defaults. Environment variables
    /// with the `RA_` prefix are applied on top in both cases, and the result
    /// is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, if
    /// an environment override is malformed, or if validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let mut config = match fs::read_to_string(path) {
            Ok(config_str) => toml::from_str::<Config>(&config_str)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Config file not found at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::error!("Failed to read config file {}: {}", path.display(), e);
                return Err(e.into());
            }
        };

        config.apply_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `config.toml` from the OS-specific config directory, or defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::config_dir() {
            Some(dir) => Self::load(dir.join("config.toml")),
            None => {
                let mut config = Self::default();
                config.apply_env_vars()?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Applies environment variable overrides to the configuration.
    ///
    /// Environment variables are prefixed with `RA_` and use `_` as a
    /// separator, e.g. `RA_LEDGER_MODE=rpc`.
    ///
    /// # Errors
    ///
    /// Returns an error if any recognised variable cannot be parsed.
    pub fn apply_env_vars(&mut self) -> Result<(), ConfigError> {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }

                match stripped.to_lowercase().as_str() {
                    "logging_level" => {
                        self.logging.level = value.parse().map_err(|_| {
                            ConfigError::invalid_value("logging.level", value, "Invalid log level")
                        })?;
                    }
                    "ledger_mode" => {
                        self.ledger.mode = value.parse().map_err(|_| {
                            ConfigError::invalid_value("ledger.mode", value, "Expected simulated or rpc")
                        })?;
                    }
                    "ledger_rpc_url" => self.ledger.rpc_url = value.to_string(),
                    "ledger_contract_id" => self.ledger.contract_id = value.to_string(),
                    "ledger_network_passphrase" => self.ledger.network_passphrase = value.to_string(),
                    "ledger_timeout_seconds" => {
                        self.ledger.timeout_seconds = value.parse().map_err(|_| {
                            ConfigError::invalid_value("ledger.timeout_seconds", value, "Expected an integer")
                        })?;
                    }
                    "normalization_date_policy" => {
                        self.normalization.date_policy = value.parse().map_err(|_| {
                            ConfigError::invalid_value(
                                "normalization.date_policy",
                                value,
                                "Expected fallback_to_now or reject",
                            )
                        })?;
                    }
                    "idempotency_ttl_seconds" => {
                        self.idempotency.ttl_seconds = value.parse().map_err(|_| {
                            ConfigError::invalid_value("idempotency.ttl_seconds", value, "Expected an integer")
                        })?;
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }

    /// Builds the revenue aggregator described by this configuration.
    pub fn aggregator(&self) -> PeriodAggregator {
        PeriodAggregator::new(
            Normalizer::new(self.normalization.date_policy, self.normalization.default_currency.clone()),
            self.commitment.leaf_encoding,
        )
    }

    /// Returns the path to the directory where configuration files should be stored.
    ///
    /// This is OS-specific:
    /// - Linux: `$HOME/.config/revenue-attest`
    /// - macOS: `$HOME/Library/Application Support/com.revenue-attest.revenue-attest`
    /// - Windows: `%APPDATA%\\revenue-attest\\revenue-attest`
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", APP_NAME, APP_NAME).map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ledger.mode, LedgerMode::Simulated);
        assert_eq!(config.idempotency.ttl(), Duration::from_secs(86_400));
        assert_eq!(config.commitment.leaf_encoding, LeafEncoding::V1);
        assert!(config.validate().is_ok());
    }
}
