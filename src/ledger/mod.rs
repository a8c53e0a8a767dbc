//! Ledger clients that anchor Merkle roots externally.
//!
//! The pipeline depends only on [`LedgerClient`]. Which implementation backs
//! it is decided once, from configuration, by [`from_config`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{LedgerConfig, LedgerMode};
use crate::core::LeafEncoding;
use crate::error::Result;

#[cfg(feature = "rpc-ledger")]
pub mod rpc;
pub mod simulated;

#[cfg(feature = "rpc-ledger")]
pub use rpc::RpcLedgerClient;
pub use simulated::SimulatedLedger;

/// Errors a ledger client may report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger endpoint could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete within the client's timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The ledger refused the submission.
    #[error("ledger rejected the request: {0}")]
    Rejected(String),

    /// The ledger answered with something the client cannot interpret.
    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),
}

/// Acknowledgement of a submitted root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    /// Transaction that carried the root.
    pub tx_hash: String,
}

/// An attestation as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainAttestation {
    /// Hex-encoded Merkle root.
    pub merkle_root: String,
    /// Unix timestamp (seconds) when the attestation was written.
    pub timestamp: i64,
    /// Leaf encoding version the root was built with, if recorded.
    #[serde(default)]
    pub version: Option<u32>,
}

/// External ledger that records one root per business and period.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Anchors `root` for `business_id` and `period`.
    async fn submit_root(
        &self,
        root: &str,
        business_id: &str,
        period: &str,
    ) -> std::result::Result<LedgerReceipt, LedgerError>;

    /// Reads back the attestation for `business_id` and `period`, if any.
    async fn get_attestation(
        &self,
        business_id: &str,
        period: &str,
    ) -> std::result::Result<Option<OnChainAttestation>, LedgerError>;
}

/// Builds the ledger client selected by `config.mode`.
///
/// # Errors
///
/// Returns `AttestError::NotSupported` when `rpc` mode is requested but the
/// crate was built without the `rpc-ledger` feature, and
/// `AttestError::LedgerSetup` when the RPC client cannot be constructed.
pub fn from_config(config: &LedgerConfig, encoding: LeafEncoding) -> Result<Arc<dyn LedgerClient>> {
    match config.mode {
        LedgerMode::Simulated => {
            log::info!("Using simulated ledger");
            Ok(Arc::new(SimulatedLedger::new(encoding)))
        }
        #[cfg(feature = "rpc-ledger")]
        LedgerMode::Rpc => {
            log::info!("Using RPC ledger at {}", config.rpc_url);
            let client = RpcLedgerClient::new(rpc::RpcLedgerSettings::from_config(config, encoding))?;
            Ok(Arc::new(client))
        }
        #[cfg(not(feature = "rpc-ledger"))]
        LedgerMode::Rpc => Err(crate::error::AttestError::not_supported(
            "ledger.mode = \"rpc\" requires the rpc-ledger feature",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_simulated() {
        let config = LedgerConfig::default();
        assert_eq!(config.mode, LedgerMode::Simulated);
        let client = from_config(&config, LeafEncoding::V1).unwrap();
        let receipt = client.submit_root(&"0".repeat(64), "biz", "2025-01").await.unwrap();
        assert_eq!(receipt.tx_hash.len(), 64);
    }

    #[cfg(feature = "rpc-ledger")]
    #[test]
    fn test_from_config_rpc() {
        let config = LedgerConfig {
            mode: LedgerMode::Rpc,
            rpc_url: "http://127.0.0.1:8000/rpc".to_string(),
            ..LedgerConfig::default()
        };
        assert!(from_config(&config, LeafEncoding::V1).is_ok());
    }
}
