//! Period-over-period anomaly scoring for aggregated revenue series.
//!
//! The scorer flags sharp drops and spikes between consecutive periods. It
//! never blocks an attestation; the pipeline only logs what it finds.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One data point of a revenue series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRevenue {
    /// Period key, e.g. `"2026-01"`.
    pub period: String,
    /// Total revenue for the period in major currency units.
    pub amount: f64,
}

/// Classification of the worst change found in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AnomalyFlag {
    /// No change crossed a threshold.
    Ok,
    /// Revenue fell sharply against the prior period.
    UnusualDrop,
    /// Revenue rose sharply against the prior period.
    UnusualSpike,
    /// Too few data points to judge.
    InsufficientData,
}

/// Thresholds for [`detect_revenue_anomaly`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyThresholds {
    /// Fractional fall that counts as a drop (0.4 = 40%).
    pub drop_threshold: f64,
    /// Fractional rise that counts as a spike (3.0 = 300%).
    pub spike_threshold: f64,
    /// Minimum number of points required.
    pub min_data_points: usize,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            drop_threshold: 0.4,
            spike_threshold: 3.0,
            min_data_points: 2,
        }
    }
}

/// Result of scoring one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// 0 = normal, 1 = highly anomalous.
    pub score: f64,
    /// Classification of the worst change.
    pub flag: AnomalyFlag,
    /// Human-readable explanation.
    pub detail: String,
}

/// Scores a series by its worst period-over-period change.
///
/// The series is sorted by period key first. Pairs whose earlier amount is
/// zero are skipped.
pub fn detect_revenue_anomaly(series: &[PeriodRevenue], thresholds: &AnomalyThresholds) -> AnomalyReport {
    if series.len() < thresholds.min_data_points.max(2) {
        return AnomalyReport {
            score: 0.0,
            flag: AnomalyFlag::InsufficientData,
            detail: format!(
                "Need at least {} data points; received {}.",
                thresholds.min_data_points.max(2),
                series.len()
            ),
        };
    }

    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.period.cmp(&b.period));

    let mut report = AnomalyReport {
        score: 0.0,
        flag: AnomalyFlag::Ok,
        detail: "No anomaly detected.".to_string(),
    };

    for pair in sorted.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        if prev.amount == 0.0 {
            continue;
        }

        let change = (curr.amount - prev.amount) / prev.amount;
        let score = change.abs().min(1.0);
        let flag = if change <= -thresholds.drop_threshold {
            AnomalyFlag::UnusualDrop
        } else if change >= thresholds.spike_threshold {
            AnomalyFlag::UnusualSpike
        } else {
            continue;
        };
        if score <= report.score {
            continue;
        }

        let verb = if flag == AnomalyFlag::UnusualDrop { "dropped" } else { "spiked" };
        report = AnomalyReport {
            score,
            flag,
            detail: format!(
                "Revenue {} {:.1}% from {} ({}) to {} ({}).",
                verb,
                change.abs() * 100.0,
                prev.period,
                prev.amount,
                curr.period,
                curr.amount
            ),
        };
    }

    report
}
