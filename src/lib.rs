// src/lib.rs

//! Revenue attestation: Merkle commitments over monthly revenue, anchored on
//! an external ledger.
//!
//! The [`core`](crate::core) module holds the commitment engine (hashing, tree, proofs,
//! leaf encoding). [`revenue`] turns raw rows into leaves, and
//! [`attestation`] drives a submission end to end against injected
//! [`revenue::RevenueSource`], [`ledger::LedgerClient`] and
//! [`storage::AttestationRepository`] collaborators.

pub mod attestation;
pub mod config;
pub mod core;
pub mod error;
pub mod idempotency;
pub mod ledger;
pub mod logging;
pub mod revenue;
pub mod storage;
pub mod test_utils;
pub mod types;

// Re-export key types for easier use by consumers of the library
pub use attestation::{
    AttestationPipeline, AttestationResult, AttestationRevoker, AttestationSubmissionError, RevocationError, Stage,
};
pub use config::Config;
pub use crate::core::{LeafEncoding, MerkleError, MerkleTree, Proof, ProofPosition, ProofStep};
pub use error::{AttestError, Result};
pub use idempotency::{IdempotencyCache, IdempotencyEntry, IdempotencyKey};
pub use types::LogLevel;

/// Loads configuration from `config_path` (or the default location) and
/// initialises logging from it.
///
/// # Errors
///
/// Fails if the configuration cannot be loaded or a logger is already set.
pub fn init(config_path: Option<&str>) -> Result<Config> {
    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    logging::init(&config.logging)?;
    log::info!("revenue-attest initialised, ledger mode {}", config.ledger.mode);
    Ok(config)
}
