//! Errors raised while submitting or revoking attestations.

use strum::{Display, EnumString};
use thiserror::Error;

use crate::core::MerkleError;
use crate::ledger::LedgerError;
use crate::revenue::{NormalizeError, PeriodError, RevenueSourceError};
use crate::storage::RepositoryError;

/// Pipeline stage at which a submission stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// The period string could not be resolved to a date range.
    InvalidPeriod,
    /// The revenue source call failed.
    RevenueFetch,
    /// The revenue source returned no rows.
    NoRevenueData,
    /// A row was rejected during normalization.
    Normalization,
    /// The Merkle commitment could not be built.
    CommitmentBuild,
    /// The ledger refused or failed the submission.
    LedgerSubmission,
    /// The attestation record could not be stored.
    Persistence,
}

impl Stage {
    /// Whether retrying the same request may succeed.
    ///
    /// Only collaborator failures qualify; bad input fails the same way again.
    pub fn is_retryable(self) -> bool {
        matches!(self, Stage::RevenueFetch | Stage::LedgerSubmission | Stage::Persistence)
    }
}

/// The failure of a single pipeline stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    /// See [`Stage::InvalidPeriod`].
    #[error(transparent)]
    InvalidPeriod(#[from] PeriodError),

    /// See [`Stage::RevenueFetch`].
    #[error("Failed to fetch revenue: {0}")]
    RevenueFetch(#[source] RevenueSourceError),

    /// See [`Stage::NoRevenueData`].
    #[error("No revenue found for the period {period}")]
    NoRevenueData {
        /// The period that came back empty.
        period: String,
    },

    /// See [`Stage::Normalization`].
    #[error(transparent)]
    Normalization(#[from] NormalizeError),

    /// See [`Stage::CommitmentBuild`].
    #[error("Failed to generate Merkle root from aggregated data: {0}")]
    CommitmentBuild(#[source] MerkleError),

    /// See [`Stage::LedgerSubmission`].
    #[error("Ledger submission failed: {0}")]
    LedgerSubmission(#[source] LedgerError),

    /// See [`Stage::Persistence`].
    #[error("Failed to save attestation: {0}")]
    Persistence(#[source] RepositoryError),
}

impl StageError {
    /// The stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            StageError::InvalidPeriod(_) => Stage::InvalidPeriod,
            StageError::RevenueFetch(_) => Stage::RevenueFetch,
            StageError::NoRevenueData { .. } => Stage::NoRevenueData,
            StageError::Normalization(_) => Stage::Normalization,
            StageError::CommitmentBuild(_) => Stage::CommitmentBuild,
            StageError::LedgerSubmission(_) => Stage::LedgerSubmission,
            StageError::Persistence(_) => Stage::Persistence,
        }
    }
}

/// Outer error of [`AttestationPipeline::submit`](super::AttestationPipeline::submit).
///
/// Displays as `Attestation submission failed: <stage message>` and exposes
/// the stage error through `source()`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Attestation submission failed: {source}")]
pub struct AttestationSubmissionError {
    #[source]
    source: StageError,
}

impl AttestationSubmissionError {
    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        self.source.stage()
    }

    /// The underlying stage error.
    pub fn cause(&self) -> &StageError {
        &self.source
    }

    /// Consumes the wrapper, returning the stage error.
    pub fn into_cause(self) -> StageError {
        self.source
    }
}

impl From<StageError> for AttestationSubmissionError {
    fn from(source: StageError) -> Self {
        Self { source }
    }
}

/// Errors raised by [`AttestationRevoker::revoke`](super::AttestationRevoker::revoke).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevocationError {
    /// No attestation carries the id.
    #[error("Attestation not found: {0}")]
    NotFound(String),

    /// The requesting user does not own the attestation's business.
    #[error("Unauthorized: attestation does not belong to your business")]
    Unauthorized,

    /// The attestation was revoked before.
    #[error("Attestation {0} is already revoked")]
    AlreadyRevoked(String),

    /// The repository failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_wrapper_message_and_source() {
        let err: AttestationSubmissionError = StageError::NoRevenueData {
            period: "2025-10".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Attestation submission failed: No revenue found for the period 2025-10"
        );
        assert_eq!(err.stage(), Stage::NoRevenueData);
        let source = err.source().expect("stage error as source");
        assert_eq!(source.to_string(), "No revenue found for the period 2025-10");
    }

    #[test]
    fn test_chain_reaches_collaborator_error() {
        let err: AttestationSubmissionError =
            StageError::LedgerSubmission(LedgerError::Rejected("contract paused".into())).into();
        assert_eq!(
            err.to_string(),
            "Attestation submission failed: Ledger submission failed: ledger rejected the request: contract paused"
        );
        let ledger = err.source().and_then(|s| s.source()).expect("ledger error");
        assert_eq!(ledger.to_string(), "ledger rejected the request: contract paused");
    }

    #[test]
    fn test_retryable_stages() {
        assert!(Stage::LedgerSubmission.is_retryable());
        assert!(Stage::RevenueFetch.is_retryable());
        assert!(!Stage::NoRevenueData.is_retryable());
        assert!(!Stage::InvalidPeriod.is_retryable());
        assert_eq!(Stage::CommitmentBuild.to_string(), "commitment_build");
    }
}
