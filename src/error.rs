//! Error types for revenue attestation
//!
//! Each subsystem reports its own typed error (`MerkleError`, `LedgerError`,
//! `AttestationSubmissionError`, ...). `AttestError` gathers them for
//! crate-level plumbing such as loading configuration and wiring clients.

use thiserror::Error;

use crate::attestation::{AttestationSubmissionError, RevocationError};
use crate::core::MerkleError;

/// Main error type for the revenue attestation crate
#[derive(Error, Debug)]
pub enum AttestError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),

    /// Merkle tree operation failed
    #[error("Merkle tree error: {0}")]
    MerkleTreeError(#[from] MerkleError),

    /// The attestation pipeline failed
    #[error(transparent)]
    Submission(#[from] AttestationSubmissionError),

    /// Revoking an attestation failed
    #[error("Revocation error: {0}")]
    Revocation(#[from] RevocationError),

    /// A ledger client could not be constructed
    #[error("Ledger setup error: {0}")]
    LedgerSetup(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not supported
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

/// Result type alias for operations that can fail with an [AttestError]
pub type Result<T> = std::result::Result<T, AttestError>;

impl AttestError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        AttestError::InvalidInput(msg.into())
    }

    /// Create a new not supported error
    pub fn not_supported<S: Into<String>>(what: S) -> Self {
        AttestError::NotSupported(what.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_and_conversions() {
        assert_eq!(AttestError::invalid_input("bad").to_string(), "Invalid input: bad");
        assert_eq!(AttestError::not_supported("rpc").to_string(), "Operation not supported: rpc");

        let err: AttestError = MerkleError::EmptyInput.into();
        assert!(matches!(err, AttestError::MerkleTreeError(MerkleError::EmptyInput)));
    }
}
