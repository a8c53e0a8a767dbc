//! Configuration validation for revenue attestation
//!
//! This module contains functions for validating the application configuration
//! to ensure all values are within acceptable ranges and consistent with each other.

use url::Url;

use super::error::ConfigError;
use super::{Config, IdempotencyConfig, LedgerConfig, LedgerMode, NormalizationConfig};
use crate::revenue::AnomalyThresholds;

/// Length of a contract strkey (`C` followed by 55 base32 characters).
const CONTRACT_ID_LEN: usize = 56;

/// Validates the application configuration.
///
/// # Errors
///
/// Returns a `ConfigError` if any validation check fails.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_ledger_config(&config.ledger)?;
    validate_normalization_config(&config.normalization)?;
    validate_anomaly_thresholds(&config.anomaly)?;
    validate_idempotency_config(&config.idempotency)?;
    Ok(())
}

fn validate_ledger_config(config: &LedgerConfig) -> Result<(), ConfigError> {
    if config.timeout_seconds == 0 {
        return Err(ConfigError::invalid_value(
            "ledger.timeout_seconds",
            config.timeout_seconds,
            "timeout_seconds must be greater than 0",
        ));
    }

    if config.mode != LedgerMode::Rpc {
        return Ok(());
    }

    let url = Url::parse(&config.rpc_url)
        .map_err(|e| ConfigError::invalid_value("ledger.rpc_url", &config.rpc_url, e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::invalid_value(
            "ledger.rpc_url",
            &config.rpc_url,
            "rpc_url must use http or https",
        ));
    }

    if config.contract_id.is_empty() {
        return Err(ConfigError::missing_value("ledger.contract_id"));
    }
    validate_contract_id(&config.contract_id)?;

    if config.network_passphrase.trim().is_empty() {
        return Err(ConfigError::missing_value("ledger.network_passphrase"));
    }

    Ok(())
}

/// Contract ids are `C`-prefixed base32 strkeys.
pub fn validate_contract_id(contract_id: &str) -> Result<(), ConfigError> {
    let well_formed = contract_id.len() == CONTRACT_ID_LEN
        && contract_id.starts_with('C')
        && contract_id
            .chars()
            .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c));

    if well_formed {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            "ledger.contract_id",
            contract_id,
            "contract_id must be a 56 character C... strkey",
        ))
    }
}

fn validate_normalization_config(config: &NormalizationConfig) -> Result<(), ConfigError> {
    let currency = config.default_currency.trim();
    if currency.is_empty() {
        return Err(ConfigError::missing_value("normalization.default_currency"));
    }
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::invalid_value(
            "normalization.default_currency",
            currency,
            "default_currency must be a three letter code",
        ));
    }
    Ok(())
}

fn validate_anomaly_thresholds(thresholds: &AnomalyThresholds) -> Result<(), ConfigError> {
    if !(thresholds.drop_threshold > 0.0 && thresholds.drop_threshold <= 1.0) {
        return Err(ConfigError::invalid_value(
            "anomaly.drop_threshold",
            thresholds.drop_threshold,
            "drop_threshold must be in (0, 1]",
        ));
    }
    if !(thresholds.spike_threshold > 0.0 && thresholds.spike_threshold.is_finite()) {
        return Err(ConfigError::invalid_value(
            "anomaly.spike_threshold",
            thresholds.spike_threshold,
            "spike_threshold must be a positive finite fraction",
        ));
    }
    if thresholds.min_data_points < 2 {
        return Err(ConfigError::invalid_value(
            "anomaly.min_data_points",
            thresholds.min_data_points,
            "min_data_points must be at least 2",
        ));
    }
    Ok(())
}

fn validate_idempotency_config(config: &IdempotencyConfig) -> Result<(), ConfigError> {
    if config.ttl_seconds == 0 {
        return Err(ConfigError::invalid_value(
            "idempotency.ttl_seconds",
            config.ttl_seconds,
            "ttl_seconds must be greater than 0",
        ));
    }
    Ok(())
}
