//! Owner-checked revocation of stored attestations.

use std::sync::Arc;

use chrono::Utc;

use super::error::RevocationError;
use crate::storage::{AttestationRecord, AttestationRepository, AttestationStatus, BusinessDirectory};

/// Revokes attestations on behalf of the owning user.
#[derive(Clone)]
pub struct AttestationRevoker {
    repository: Arc<dyn AttestationRepository>,
    businesses: Arc<dyn BusinessDirectory>,
}

impl AttestationRevoker {
    /// Creates a revoker over the given repository and business directory.
    pub fn new(repository: Arc<dyn AttestationRepository>, businesses: Arc<dyn BusinessDirectory>) -> Self {
        Self { repository, businesses }
    }

    /// Marks `attestation_id` revoked if `user_id` owns its business.
    ///
    /// Ownership is checked before status, so a stranger probing a revoked
    /// attestation sees `Unauthorized`. The ledger entry is left in place.
    pub async fn revoke(&self, attestation_id: &str, user_id: &str) -> Result<AttestationRecord, RevocationError> {
        let attestation = self
            .repository
            .find_by_id(attestation_id)
            .await?
            .ok_or_else(|| RevocationError::NotFound(attestation_id.to_string()))?;

        let owner = self.businesses.find_owner(&attestation.business_id).await?;
        if owner.as_deref() != Some(user_id) {
            log::warn!(
                "User {} tried to revoke attestation {} of business {}",
                user_id,
                attestation_id,
                attestation.business_id
            );
            return Err(RevocationError::Unauthorized);
        }

        if attestation.status == AttestationStatus::Revoked {
            return Err(RevocationError::AlreadyRevoked(attestation_id.to_string()));
        }

        let updated = self
            .repository
            .update_status(attestation_id, AttestationStatus::Revoked, Some(Utc::now()))
            .await?;
        log::info!("Revoked attestation {} for business {}", attestation_id, updated.business_id);
        Ok(updated)
    }
}
