// src/test_utils.rs

//! Shared fixtures for unit tests, integration tests and benchmarks.

use std::sync::{Arc, OnceLock};

use crate::attestation::AttestationPipeline;
use crate::config::Config;
use crate::ledger::SimulatedLedger;
use crate::revenue::{RawRevenueRecord, StaticRevenueSource};
use crate::storage::MemoryAttestationRepository;

/// Provides a common test configuration: simulated ledger, defaults elsewhere.
pub fn get_test_config() -> &'static Config {
    static TEST_CONFIG: OnceLock<Config> = OnceLock::new();
    TEST_CONFIG.get_or_init(Config::default)
}

/// Two payments in January and a refund in February 2025.
pub fn sample_records() -> Vec<RawRevenueRecord> {
    vec![
        RawRevenueRecord::new("2025-01-05", 100.0, "usd"),
        RawRevenueRecord::new("2025-01-20", 50.0, "usd"),
        RawRevenueRecord::new("2025-02-01", -10.0, "usd"),
    ]
}

/// A row whose date no parser accepts.
pub fn undated_record(amount: f64) -> RawRevenueRecord {
    RawRevenueRecord::new("not-a-date", amount, "usd")
}

/// Leaves `"leaf-0"`, `"leaf-1"`, ... for tree tests.
pub fn numbered_leaves(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("leaf-{}", i)).collect()
}

/// A pipeline wired to in-memory doubles, with handles to each double.
pub struct TestHarness {
    /// The pipeline under test.
    pub pipeline: AttestationPipeline,
    /// Its revenue source.
    pub revenue: Arc<StaticRevenueSource>,
    /// Its ledger.
    pub ledger: Arc<SimulatedLedger>,
    /// Its repository.
    pub repository: Arc<MemoryAttestationRepository>,
}

impl TestHarness {
    /// Builds a harness whose revenue source answers with `records`.
    pub fn new(records: Vec<RawRevenueRecord>) -> Self {
        let revenue = Arc::new(StaticRevenueSource::new(records));
        let ledger = Arc::new(SimulatedLedger::default());
        let repository = Arc::new(MemoryAttestationRepository::new());
        let pipeline = AttestationPipeline::new(revenue.clone(), ledger.clone(), repository.clone());
        Self {
            pipeline,
            revenue,
            ledger,
            repository,
        }
    }
}
