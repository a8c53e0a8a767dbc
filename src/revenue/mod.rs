// src/revenue/mod.rs

/// Monthly aggregation and leaf construction.
pub mod aggregate;
/// Period-over-period anomaly scoring.
pub mod anomaly;
/// Canonical normalization of raw revenue rows.
pub mod normalize;
/// `YYYY-MM` / `YYYY-Qn` periods and their date ranges.
pub mod period;
/// The revenue source contract.
pub mod source;

pub use aggregate::{aggregate, to_leaves, AggregatedPeriod, PeriodAggregator};
pub use anomaly::{detect_revenue_anomaly, AnomalyFlag, AnomalyReport, AnomalyThresholds, PeriodRevenue};
pub use normalize::{
    normalize, CanonicalRecord, DatePolicy, NormalizeError, Normalizer, RawDate, RawRevenueRecord, RevenueType,
    DEFAULT_CURRENCY,
};
pub use period::{DateRange, Period, PeriodError};
pub use source::{RevenueSource, RevenueSourceError, StaticRevenueSource};
