// src/storage/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::storage::{
    AttestationRecord, AttestationRepository, AttestationStatus, BusinessDirectory, NewAttestation,
    RepositoryError,
};

/// An in-memory attestation repository, primarily for testing or ephemeral use.
///
/// Records are stored in a `DashMap` keyed by id for thread-safe concurrent
/// access. Clones share the same underlying map.
///
/// It also includes a mechanism to simulate write failures for testing
/// error handling paths, configurable via `set_fail_on_create`.
#[derive(Debug, Clone, Default)]
pub struct MemoryAttestationRepository {
    records: Arc<DashMap<String, AttestationRecord>>,
    fail_on_create: Arc<Mutex<Option<String>>>,
    create_calls: Arc<AtomicUsize>,
}

impl MemoryAttestationRepository {
    /// Creates a new, empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `create` calls fail with `message`.
    pub fn set_fail_on_create(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.fail_on_create.lock() {
            *guard = Some(message.into());
        }
    }

    /// Clears any previously set failure condition for `create`.
    pub fn clear_fail_on_create(&self) {
        if let Ok(mut guard) = self.fail_on_create.lock() {
            *guard = None;
        }
    }

    /// Number of `create` calls received, failed ones included.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks if the repository holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes all records.
    pub fn clear(&self) {
        self.records.clear();
    }
}

#[async_trait]
impl AttestationRepository for MemoryAttestationRepository {
    async fn create(&self, attestation: NewAttestation) -> Result<AttestationRecord, RepositoryError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.fail_on_create.lock().ok().and_then(|guard| guard.clone());
        if let Some(message) = failure {
            return Err(RepositoryError::Backend(format!(
                "Simulated MemoryAttestationRepository write failure: {}",
                message
            )));
        }

        let record = AttestationRecord {
            id: Uuid::new_v4().to_string(),
            business_id: attestation.business_id,
            period: attestation.period,
            merkle_root: attestation.merkle_root,
            tx_hash: attestation.tx_hash,
            status: AttestationStatus::Active,
            created_at: Utc::now(),
            revoked_at: None,
        };
        self.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AttestationRecord>, RepositoryError> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    async fn update_status(
        &self,
        id: &str,
        status: AttestationStatus,
        revoked_at: Option<DateTime<Utc>>,
    ) -> Result<AttestationRecord, RepositoryError> {
        let mut entry = self
            .records
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        entry.status = status;
        entry.revoked_at = revoked_at;
        Ok(entry.value().clone())
    }
}

/// An in-memory business directory mapping business ids to owning users.
#[derive(Debug, Clone, Default)]
pub struct MemoryBusinessDirectory {
    owners: Arc<DashMap<String, String>>,
}

impl MemoryBusinessDirectory {
    /// Creates a new, empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `business_id` as owned by `user_id`.
    pub fn insert(&self, business_id: impl Into<String>, user_id: impl Into<String>) {
        self.owners.insert(business_id.into(), user_id.into());
    }
}

#[async_trait]
impl BusinessDirectory for MemoryBusinessDirectory {
    async fn find_owner(&self, business_id: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self.owners.get(business_id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_attestation() -> NewAttestation {
        NewAttestation {
            business_id: "biz_1".to_string(),
            period: "2025-10".to_string(),
            merkle_root: "ab".repeat(32),
            tx_hash: "tx_1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = MemoryAttestationRepository::new();
        assert!(repo.is_empty());

        let record = repo.create(new_attestation()).await.unwrap();
        assert_eq!(record.status, AttestationStatus::Active);
        assert!(Uuid::parse_str(&record.id).is_ok());

        let found = repo.find_by_id(&record.id).await.unwrap();
        assert_eq!(found, Some(record));
        assert_eq!(repo.find_by_id("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_status() {
        let repo = MemoryAttestationRepository::new();
        let record = repo.create(new_attestation()).await.unwrap();
        let now = Utc::now();

        let updated = repo.update_status(&record.id, AttestationStatus::Revoked, Some(now)).await.unwrap();
        assert_eq!(updated.status, AttestationStatus::Revoked);
        assert_eq!(updated.revoked_at, Some(now));

        let err = repo.update_status("missing", AttestationStatus::Revoked, None).await.unwrap_err();
        assert_eq!(err, RepositoryError::NotFound("missing".to_string()));
    }

    #[tokio::test]
    async fn test_fail_on_create_and_clear() {
        let repo = MemoryAttestationRepository::new();
        repo.set_fail_on_create("disk full");
        assert!(matches!(repo.create(new_attestation()).await, Err(RepositoryError::Backend(_))));
        assert!(repo.is_empty());

        repo.clear_fail_on_create();
        repo.create(new_attestation()).await.unwrap();
        assert_eq!(repo.create_calls(), 2);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_business_directory() {
        let directory = MemoryBusinessDirectory::new();
        directory.insert("biz_1", "user_1");
        assert_eq!(directory.find_owner("biz_1").await.unwrap().as_deref(), Some("user_1"));
        assert_eq!(directory.find_owner("biz_2").await.unwrap(), None);
    }
}
