//! Type definitions for configuration

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, EnumVariantNames};

/// Which ledger client backs attestation submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumVariantNames, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LedgerMode {
    /// In-process ledger with deterministic transaction hashes
    Simulated,
    /// JSON-RPC ledger gateway over HTTP
    Rpc,
}

impl Default for LedgerMode {
    fn default() -> Self {
        LedgerMode::Simulated
    }
}
