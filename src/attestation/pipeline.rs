//! The attestation submission pipeline.
//!
//! `submit` runs period resolution, revenue fetch, normalization and
//! aggregation, commitment, ledger submission and persistence in that order.
//! The first failing stage ends the run.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::error::{AttestationSubmissionError, StageError};
use crate::config::Config;
use crate::core::MerkleTree;
use crate::ledger::{self, LedgerClient};
use crate::revenue::{
    detect_revenue_anomaly, AggregatedPeriod, AnomalyFlag, AnomalyReport, AnomalyThresholds, Period, PeriodAggregator,
    PeriodRevenue, RevenueSource,
};
use crate::storage::{AttestationRepository, NewAttestation};

/// What a successful submission hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationResult {
    /// Id of the stored attestation record.
    pub attestation_id: String,
    /// Ledger transaction that carried the root.
    pub tx_hash: String,
}

/// Turns a business's revenue for a period into an anchored commitment.
#[derive(Clone)]
pub struct AttestationPipeline {
    revenue: Arc<dyn RevenueSource>,
    ledger: Arc<dyn LedgerClient>,
    repository: Arc<dyn AttestationRepository>,
    aggregator: PeriodAggregator,
    anomaly: AnomalyThresholds,
}

impl AttestationPipeline {
    /// Creates a pipeline with the default aggregator and anomaly thresholds.
    pub fn new(
        revenue: Arc<dyn RevenueSource>,
        ledger: Arc<dyn LedgerClient>,
        repository: Arc<dyn AttestationRepository>,
    ) -> Self {
        Self {
            revenue,
            ledger,
            repository,
            aggregator: PeriodAggregator::default(),
            anomaly: AnomalyThresholds::default(),
        }
    }

    /// Wires the pipeline from configuration, constructing the ledger client.
    ///
    /// # Errors
    ///
    /// Fails if the configured ledger client cannot be built.
    pub fn from_config(
        config: &Config,
        revenue: Arc<dyn RevenueSource>,
        repository: Arc<dyn AttestationRepository>,
    ) -> crate::error::Result<Self> {
        let ledger = ledger::from_config(&config.ledger, config.commitment.leaf_encoding)?;
        Ok(Self::new(revenue, ledger, repository)
            .with_aggregator(config.aggregator())
            .with_anomaly_thresholds(config.anomaly))
    }

    /// Replaces the aggregator.
    pub fn with_aggregator(mut self, aggregator: PeriodAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Replaces the anomaly thresholds.
    pub fn with_anomaly_thresholds(mut self, thresholds: AnomalyThresholds) -> Self {
        self.anomaly = thresholds;
        self
    }

    /// Submits an attestation for `business_id` over `period`.
    ///
    /// # Errors
    ///
    /// Returns an [`AttestationSubmissionError`] naming the first stage that
    /// failed. The ledger is never called unless there is revenue to commit,
    /// and nothing is persisted unless the ledger accepted the root.
    pub async fn submit(
        &self,
        business_id: &str,
        period: &str,
    ) -> Result<AttestationResult, AttestationSubmissionError> {
        match self.run(business_id, period).await {
            Ok(result) => {
                log::info!(
                    "Attested {} for business {}: attestation {} in tx {}",
                    period,
                    business_id,
                    result.attestation_id,
                    result.tx_hash
                );
                Ok(result)
            }
            Err(stage_error) => {
                let err = AttestationSubmissionError::from(stage_error);
                log::error!(
                    "Submission for business {} period {} stopped at {}: {}",
                    business_id,
                    period,
                    err.stage(),
                    err
                );
                Err(err)
            }
        }
    }

    async fn run(&self, business_id: &str, period: &str) -> Result<AttestationResult, StageError> {
        let range = period.parse::<Period>()?.date_range()?;
        log::debug!("Resolved period {} to {} .. {}", period, range.start_iso(), range.end_iso());

        let raw = self.revenue.fetch(&range).await.map_err(StageError::RevenueFetch)?;
        if raw.is_empty() {
            return Err(StageError::NoRevenueData {
                period: period.to_string(),
            });
        }
        log::debug!("Fetched {} revenue rows for {}", raw.len(), period);

        let aggregated = self.aggregator.aggregate(&raw, Utc::now())?;
        self.report_anomalies(business_id, &aggregated);

        let tree = MerkleTree::new(&aggregated.leaves).map_err(StageError::CommitmentBuild)?;
        let root = tree.root_hash().to_string();
        log::debug!("Built commitment over {} leaves, root {}", tree.leaf_count(), root);

        let receipt = self
            .ledger
            .submit_root(&root, business_id, period)
            .await
            .map_err(StageError::LedgerSubmission)?;
        log::debug!("Ledger accepted root {} in tx {}", root, receipt.tx_hash);

        let record = self
            .repository
            .create(NewAttestation {
                business_id: business_id.to_string(),
                period: period.to_string(),
                merkle_root: root,
                tx_hash: receipt.tx_hash.clone(),
            })
            .await
            .map_err(StageError::Persistence)?;

        Ok(AttestationResult {
            attestation_id: record.id,
            tx_hash: receipt.tx_hash,
        })
    }

    fn report_anomalies(&self, business_id: &str, aggregated: &AggregatedPeriod) -> AnomalyReport {
        let series: Vec<PeriodRevenue> = aggregated
            .totals
            .iter()
            .map(|(period, amount)| PeriodRevenue {
                period: period.clone(),
                amount: *amount,
            })
            .collect();
        let report = detect_revenue_anomaly(&series, &self.anomaly);
        if matches!(report.flag, AnomalyFlag::UnusualDrop | AnomalyFlag::UnusualSpike) {
            log::warn!(
                "Revenue anomaly for business {}: {} (score {:.2}) {}",
                business_id,
                report.flag,
                report.score,
                report.detail
            );
        }
        report
    }
}
