//! Logger initialisation from [`LoggingConfig`].

use crate::config::LoggingConfig;
use crate::error::{AttestError, Result};

/// Installs `env_logger` at the configured level.
///
/// `RUST_LOG` still refines per-module filters on top of the configured
/// level. Does nothing when `console` is off.
///
/// # Errors
///
/// Returns `AttestError::InvalidInput` if a global logger is already set.
#[cfg(feature = "logging")]
pub fn init(config: &LoggingConfig) -> Result<()> {
    if !config.console {
        return Ok(());
    }
    env_logger::Builder::new()
        .filter_level(config.level.to_level_filter())
        .parse_default_env()
        .try_init()
        .map_err(|e| AttestError::invalid_input(format!("Logger already initialised: {}", e)))
}

/// Without the `logging` feature there is no backend to install.
#[cfg(not(feature = "logging"))]
pub fn init(config: &LoggingConfig) -> Result<()> {
    let _ = config;
    Ok(())
}
