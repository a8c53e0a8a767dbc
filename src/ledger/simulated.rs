// src/ledger/simulated.rs

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::{LedgerClient, LedgerError, LedgerReceipt, OnChainAttestation};
use crate::core::{sha256_hex, LeafEncoding};

/// In-process ledger with deterministic transaction hashes.
///
/// The n-th submission (starting at 0) gets
/// `sha256_hex("<root>:<business_id>:<period>:<n>")` as its transaction hash,
/// so a fresh instance driven by the same calls always yields the same hashes.
/// Roots are kept per (business, period), latest submission wins.
#[derive(Debug)]
pub struct SimulatedLedger {
    encoding: LeafEncoding,
    attestations: DashMap<(String, String), OnChainAttestation>,
    sequence: AtomicU64,
    submit_calls: AtomicUsize,
    fail_on_submit: Mutex<Option<LedgerError>>,
}

impl Default for SimulatedLedger {
    fn default() -> Self {
        Self::new(LeafEncoding::default())
    }
}

impl SimulatedLedger {
    /// Creates an empty ledger recording roots built with `encoding`.
    pub fn new(encoding: LeafEncoding) -> Self {
        Self {
            encoding,
            attestations: DashMap::new(),
            sequence: AtomicU64::new(0),
            submit_calls: AtomicUsize::new(0),
            fail_on_submit: Mutex::new(None),
        }
    }

    /// Makes subsequent submissions fail with `error`.
    pub fn set_fail_on_submit(&self, error: LedgerError) {
        if let Ok(mut guard) = self.fail_on_submit.lock() {
            *guard = Some(error);
        }
    }

    /// Clears any previously set failure condition.
    pub fn clear_fail_on_submit(&self) {
        if let Ok(mut guard) = self.fail_on_submit.lock() {
            *guard = None;
        }
    }

    /// Number of `submit_root` calls received, failed ones included.
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Number of (business, period) pairs holding a root.
    pub fn len(&self) -> usize {
        self.attestations.len()
    }

    /// Checks if no root has been recorded.
    pub fn is_empty(&self) -> bool {
        self.attestations.is_empty()
    }
}

#[async_trait]
impl LedgerClient for SimulatedLedger {
    async fn submit_root(
        &self,
        root: &str,
        business_id: &str,
        period: &str,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.fail_on_submit.lock().ok().and_then(|guard| guard.clone());
        if let Some(error) = failure {
            return Err(error);
        }

        let n = self.sequence.fetch_add(1, Ordering::SeqCst);
        let tx_hash = sha256_hex(format!("{}:{}:{}:{}", root, business_id, period, n).as_bytes());
        self.attestations.insert(
            (business_id.to_string(), period.to_string()),
            OnChainAttestation {
                merkle_root: root.to_string(),
                timestamp: Utc::now().timestamp(),
                version: Some(self.encoding.version_number()),
            },
        );
        log::debug!("Simulated ledger recorded {} for {}/{}", tx_hash, business_id, period);
        Ok(LedgerReceipt { tx_hash })
    }

    async fn get_attestation(
        &self,
        business_id: &str,
        period: &str,
    ) -> Result<Option<OnChainAttestation>, LedgerError> {
        Ok(self
            .attestations
            .get(&(business_id.to_string(), period.to_string()))
            .map(|entry| entry.value().clone()))
    }
}
