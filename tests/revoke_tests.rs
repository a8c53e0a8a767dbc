use std::sync::Arc;

use assert_matches::assert_matches;
use revenue_attest::attestation::{AttestationRevoker, RevocationError};
use revenue_attest::storage::{
    AttestationRepository, AttestationStatus, MemoryAttestationRepository, MemoryBusinessDirectory, NewAttestation,
};

struct Fixture {
    repository: Arc<MemoryAttestationRepository>,
    revoker: AttestationRevoker,
    attestation_id: String,
}

async fn fixture() -> Fixture {
    let repository = Arc::new(MemoryAttestationRepository::new());
    let directory = Arc::new(MemoryBusinessDirectory::new());
    directory.insert("biz_1", "user_1");
    directory.insert("biz_2", "user_2");

    let record = repository
        .create(NewAttestation {
            business_id: "biz_1".to_string(),
            period: "2025-10".to_string(),
            merkle_root: "ab".repeat(32),
            tx_hash: "tx_1".to_string(),
        })
        .await
        .unwrap();

    Fixture {
        revoker: AttestationRevoker::new(repository.clone(), directory),
        repository,
        attestation_id: record.id,
    }
}

#[tokio::test]
async fn test_owner_can_revoke() {
    let fx = fixture().await;

    let revoked = fx.revoker.revoke(&fx.attestation_id, "user_1").await.unwrap();
    assert_eq!(revoked.status, AttestationStatus::Revoked);
    assert!(revoked.revoked_at.is_some());

    let stored = fx.repository.find_by_id(&fx.attestation_id).await.unwrap().unwrap();
    assert_eq!(stored, revoked);
}

#[tokio::test]
async fn test_unknown_attestation() {
    let fx = fixture().await;
    let err = fx.revoker.revoke("missing", "user_1").await.unwrap_err();
    assert_eq!(err, RevocationError::NotFound("missing".to_string()));
    assert_eq!(err.to_string(), "Attestation not found: missing");
}

#[tokio::test]
async fn test_other_user_is_unauthorized() {
    let fx = fixture().await;
    let err = fx.revoker.revoke(&fx.attestation_id, "user_2").await.unwrap_err();
    assert_matches!(err, RevocationError::Unauthorized);

    let stored = fx.repository.find_by_id(&fx.attestation_id).await.unwrap().unwrap();
    assert_eq!(stored.status, AttestationStatus::Active);
}

#[tokio::test]
async fn test_business_without_owner_is_unauthorized() {
    let repository = Arc::new(MemoryAttestationRepository::new());
    let record = repository
        .create(NewAttestation {
            business_id: "orphan".to_string(),
            period: "2025-Q3".to_string(),
            merkle_root: "cd".repeat(32),
            tx_hash: "tx_2".to_string(),
        })
        .await
        .unwrap();
    let revoker = AttestationRevoker::new(repository, Arc::new(MemoryBusinessDirectory::new()));

    assert_matches!(
        revoker.revoke(&record.id, "user_1").await,
        Err(RevocationError::Unauthorized)
    );
}

#[tokio::test]
async fn test_second_revoke_reports_already_revoked() {
    let fx = fixture().await;
    let first = fx.revoker.revoke(&fx.attestation_id, "user_1").await.unwrap();

    let err = fx.revoker.revoke(&fx.attestation_id, "user_1").await.unwrap_err();
    assert_eq!(err, RevocationError::AlreadyRevoked(fx.attestation_id.clone()));
    assert!(err.to_string().ends_with("is already revoked"));

    let stored = fx.repository.find_by_id(&fx.attestation_id).await.unwrap().unwrap();
    assert_eq!(stored.revoked_at, first.revoked_at);
}
