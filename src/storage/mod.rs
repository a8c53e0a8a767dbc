// src/storage/mod.rs

//! Persistence contracts for attestation records and business ownership.
//!
//! The submission pipeline only ever calls [`AttestationRepository::create`];
//! lookups and status updates serve the revocation flow.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::core::Digest;

pub mod memory;

pub use memory::{MemoryAttestationRepository, MemoryBusinessDirectory};

/// Errors raised by a repository backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No record carries the requested id.
    #[error("Attestation not found: {0}")]
    NotFound(String),

    /// The backend failed to read or write.
    #[error("Storage error: {0}")]
    Backend(String),
}

/// Lifecycle state of an attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttestationStatus {
    /// Submitted and standing.
    Active,
    /// Withdrawn by its owner.
    Revoked,
}

/// Fields supplied by the pipeline when an attestation is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttestation {
    /// Business the attestation belongs to.
    pub business_id: String,
    /// Attested period, e.g. `"2025-10"` or `"2025-Q4"`.
    pub period: String,
    /// Committed Merkle root.
    pub merkle_root: Digest,
    /// Ledger transaction that carried the root.
    pub tx_hash: String,
}

/// A persisted attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    /// Generated identifier.
    pub id: String,
    /// Business the attestation belongs to.
    pub business_id: String,
    /// Attested period.
    pub period: String,
    /// Committed Merkle root.
    pub merkle_root: Digest,
    /// Ledger transaction that carried the root.
    pub tx_hash: String,
    /// Current lifecycle state.
    pub status: AttestationStatus,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was revoked, if it was.
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Storage for attestation records.
#[async_trait]
pub trait AttestationRepository: Send + Sync {
    /// Persists a new record and returns it with its generated id.
    async fn create(&self, attestation: NewAttestation) -> Result<AttestationRecord, RepositoryError>;

    /// Looks a record up by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<AttestationRecord>, RepositoryError>;

    /// Changes a record's status and returns the updated record.
    async fn update_status(
        &self,
        id: &str,
        status: AttestationStatus,
        revoked_at: Option<DateTime<Utc>>,
    ) -> Result<AttestationRecord, RepositoryError>;
}

/// Lookup of which user owns a business.
#[async_trait]
pub trait BusinessDirectory: Send + Sync {
    /// Returns the owning user's id, or `None` if the business is unknown.
    async fn find_owner(&self, business_id: &str) -> Result<Option<String>, RepositoryError>;
}
