// src/revenue/aggregate.rs

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::core::LeafEncoding;
use super::normalize::{CanonicalRecord, NormalizeError, Normalizer, RawRevenueRecord};

/// Sums canonical amounts per month key. Refunds reduce their month's sum.
///
/// The returned map iterates in ascending lexical key order, which is
/// chronological for `YYYY-MM` and `YYYY-QN` keys.
pub fn aggregate(records: &[CanonicalRecord]) -> BTreeMap<String, f64> {
    let mut aggregated = BTreeMap::new();
    for record in records {
        *aggregated.entry(record.month.clone()).or_insert(0.0) += record.amount;
    }
    aggregated
}

/// Encodes each aggregated figure as a leaf, in ascending key order.
pub fn to_leaves(aggregated: &BTreeMap<String, f64>, encoding: LeafEncoding) -> Vec<String> {
    aggregated
        .iter()
        .map(|(period, amount)| encoding.encode(period, *amount))
        .collect()
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPeriod {
    /// Summed amount per month key.
    pub totals: BTreeMap<String, f64>,
    /// Canonical leaves derived from `totals`, ready for the commitment engine.
    pub leaves: Vec<String>,
    /// Distinct currencies seen in the batch.
    pub currencies: BTreeSet<String>,
}

/// Raw rows in, ordered leaves out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodAggregator {
    normalizer: Normalizer,
    encoding: LeafEncoding,
}

impl PeriodAggregator {
    /// Creates an aggregator with the given normalizer and leaf encoding.
    pub fn new(normalizer: Normalizer, encoding: LeafEncoding) -> Self {
        Self { normalizer, encoding }
    }

    /// The normalizer applied before summing.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Leaf encoding used by [`PeriodAggregator::aggregate`].
    pub fn encoding(&self) -> LeafEncoding {
        self.encoding
    }

    /// Normalizes, sums per month and encodes the leaves.
    pub fn aggregate(
        &self,
        records: &[RawRevenueRecord],
        now: DateTime<Utc>,
    ) -> Result<AggregatedPeriod, NormalizeError> {
        let canonical = self.normalizer.normalize(records, now)?;
        let currencies: BTreeSet<String> = canonical.iter().map(|r| r.currency.clone()).collect();
        if currencies.len() > 1 {
            log::warn!(
                "Aggregating {} records across mixed currencies {:?}; amounts are summed as-is",
                canonical.len(),
                currencies
            );
        }

        let totals = aggregate(&canonical);
        let leaves = to_leaves(&totals, self.encoding);
        log::debug!("Aggregated {} records into {} leaves", canonical.len(), leaves.len());

        Ok(AggregatedPeriod { totals, leaves, currencies })
    }
}
