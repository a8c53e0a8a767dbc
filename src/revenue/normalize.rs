//! Normalization of raw revenue rows into canonical records.
//!
//! Payment processors disagree on nearly everything: date encodings,
//! currency casing, whether refunds are their own objects. Every row is
//! mapped onto [`CanonicalRecord`] before it is aggregated, so the leaves
//! committed downstream depend only on the canonical shape.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Currency assumed for rows that carry none.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Source label assumed for rows that carry none.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// A date as delivered by a revenue source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    /// Unix timestamp in seconds.
    Timestamp(i64),
    /// ISO 8601 text: RFC 3339, `YYYY-MM-DD`, or a naive `YYYY-MM-DDTHH:MM:SS`.
    Text(String),
}

/// One revenue row as fetched from an external source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRevenueRecord {
    /// Source-side identifier, if any.
    #[serde(default)]
    pub id: Option<String>,
    /// Signed amount in major currency units; negative for refunds.
    pub amount: f64,
    /// Currency code in any casing.
    #[serde(default)]
    pub currency: Option<String>,
    /// When the revenue was booked.
    #[serde(default)]
    pub date: Option<RawDate>,
    /// Which integration produced the row.
    #[serde(default)]
    pub source: Option<String>,
}

impl RawRevenueRecord {
    /// Shorthand for a row dated by an ISO string.
    pub fn new(date: impl Into<String>, amount: f64, currency: impl Into<String>) -> Self {
        Self {
            id: None,
            amount,
            currency: Some(currency.into()),
            date: Some(RawDate::Text(date.into())),
            source: None,
        }
    }
}

/// Whether a canonical record adds to or subtracts from revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RevenueType {
    /// Non-negative amount.
    Payment,
    /// Negative amount.
    Refund,
}

/// A revenue row in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Source-side identifier, if any.
    pub id: Option<String>,
    /// Normalized booking instant.
    pub date: DateTime<Utc>,
    /// `YYYY-MM` of `date`.
    pub month: String,
    /// Signed amount, unchanged from the raw row.
    pub amount: f64,
    /// Uppercased currency code.
    pub currency: String,
    /// Payment or refund, from the sign of `amount`.
    #[serde(rename = "type")]
    pub kind: RevenueType,
    /// Which integration produced the row.
    pub source: String,
}

/// What to do with a row whose date is missing or unparseable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    /// Book the row at the time of normalization.
    FallbackToNow,
    /// Fail the whole batch.
    Reject,
}

impl Default for DatePolicy {
    fn default() -> Self {
        DatePolicy::FallbackToNow
    }
}

/// Errors produced by normalization under [`DatePolicy::Reject`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// A row's date was missing or could not be parsed.
    #[error("Record {position} has an invalid date: {value}")]
    InvalidRecordDate {
        /// Zero-based position of the row in the batch.
        position: usize,
        /// The raw date, rendered for diagnostics.
        value: String,
    },
}

/// Parses a raw date into a UTC instant, if it can be understood.
pub fn parse_raw_date(raw: &RawDate) -> Option<DateTime<Utc>> {
    match raw {
        RawDate::Timestamp(secs) => Utc.timestamp_opt(*secs, 0).single(),
        RawDate::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(Utc.from_utc_datetime(&naive));
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
    }
}

fn describe_date(raw: Option<&RawDate>) -> String {
    match raw {
        None => "<missing>".to_string(),
        Some(RawDate::Timestamp(secs)) => secs.to_string(),
        Some(RawDate::Text(text)) => format!("{:?}", text),
    }
}

/// Maps raw rows onto [`CanonicalRecord`]s under a configured date policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    policy: DatePolicy,
    default_currency: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DatePolicy::default(), DEFAULT_CURRENCY)
    }
}

impl Normalizer {
    /// Creates a normalizer with the given date policy and fallback currency.
    pub fn new(policy: DatePolicy, default_currency: impl Into<String>) -> Self {
        Self {
            policy,
            default_currency: default_currency.into().to_uppercase(),
        }
    }

    /// The date policy in force.
    pub fn policy(&self) -> DatePolicy {
        self.policy
    }

    /// Normalizes a batch, using `now` as the fallback booking instant.
    ///
    /// # Errors
    ///
    /// Under [`DatePolicy::Reject`], returns `NormalizeError::InvalidRecordDate`
    /// for the first row whose date cannot be resolved.
    pub fn normalize(
        &self,
        records: &[RawRevenueRecord],
        now: DateTime<Utc>,
    ) -> Result<Vec<CanonicalRecord>, NormalizeError> {
        records
            .iter()
            .enumerate()
            .map(|(position, raw)| {
                let date = match raw.date.as_ref().and_then(parse_raw_date) {
                    Some(date) => date,
                    None => match self.policy {
                        DatePolicy::FallbackToNow => {
                            log::warn!(
                                "Record {} has date {}; booking it at {}",
                                position,
                                describe_date(raw.date.as_ref()),
                                now.to_rfc3339()
                            );
                            now
                        }
                        DatePolicy::Reject => {
                            return Err(NormalizeError::InvalidRecordDate {
                                position,
                                value: describe_date(raw.date.as_ref()),
                            })
                        }
                    },
                };
                Ok(self.canonicalize(raw, date))
            })
            .collect()
    }

    fn canonicalize(&self, raw: &RawRevenueRecord, date: DateTime<Utc>) -> CanonicalRecord {
        let currency = match raw.currency.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code.to_uppercase(),
            _ => self.default_currency.clone(),
        };
        let source = match raw.source.as_deref() {
            Some(source) if !source.is_empty() => source.to_string(),
            _ => UNKNOWN_SOURCE.to_string(),
        };

        CanonicalRecord {
            id: raw.id.clone(),
            month: date.format("%Y-%m").to_string(),
            date,
            amount: raw.amount,
            currency,
            kind: if raw.amount < 0.0 {
                RevenueType::Refund
            } else {
                RevenueType::Payment
            },
            source,
        }
    }
}

/// Normalizes with the default lossy policy, booking undated rows now.
pub fn normalize(records: &[RawRevenueRecord]) -> Vec<CanonicalRecord> {
    Normalizer::default()
        .normalize(records, Utc::now())
        .unwrap_or_else(|err| {
            log::error!("Default normalizer rejected a batch: {}", err);
            Vec::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_canonical_shape() {
        let raw = RawRevenueRecord {
            id: Some("txn_001".to_string()),
            amount: 49.99,
            currency: Some("usd".to_string()),
            date: Some(RawDate::Text("2025-11-15T10:30:00Z".to_string())),
            source: Some("stripe".to_string()),
        };
        let out = Normalizer::default().normalize(&[raw], fixed_now()).unwrap();
        assert_eq!(out.len(), 1);
        let rec = &out[0];
        assert_eq!(rec.id.as_deref(), Some("txn_001"));
        assert_eq!(rec.month, "2025-11");
        assert_eq!(rec.currency, "USD");
        assert_eq!(rec.kind, RevenueType::Payment);
        assert_eq!(rec.source, "stripe");
        assert_eq!(rec.date, Utc.with_ymd_and_hms(2025, 11, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_negative_amount_is_refund_and_keeps_sign() {
        let out = normalize(&[RawRevenueRecord::new("2025-12-01", -20.0, "EUR")]);
        assert_eq!(out[0].kind, RevenueType::Refund);
        assert_eq!(out[0].amount, -20.0);
    }

    #[test]
    fn test_zero_amount_is_payment() {
        let out = normalize(&[RawRevenueRecord::new("2025-06-01", 0.0, "INR")]);
        assert_eq!(out[0].kind, RevenueType::Payment);
    }

    #[test]
    fn test_currency_defaults_and_casing() {
        let mut raw = RawRevenueRecord::new("2025-01-01", 5.0, "gbp");
        assert_eq!(normalize(&[raw.clone()])[0].currency, "GBP");
        raw.currency = None;
        assert_eq!(normalize(&[raw.clone()])[0].currency, DEFAULT_CURRENCY);
        raw.currency = Some("  ".to_string());
        let custom = Normalizer::new(DatePolicy::Reject, "inr");
        assert_eq!(custom.normalize(&[raw], fixed_now()).unwrap()[0].currency, "INR");
    }

    #[test]
    fn test_unix_timestamp_date() {
        let raw = RawRevenueRecord {
            id: None,
            amount: 30.0,
            currency: None,
            date: Some(RawDate::Timestamp(1_700_000_000)),
            source: None,
        };
        let out = normalize(&[raw]);
        assert_eq!(out[0].date.to_rfc3339(), "2023-11-14T22:13:20+00:00");
        assert_eq!(out[0].month, "2023-11");
        assert_eq!(out[0].source, UNKNOWN_SOURCE);
    }

    #[test]
    fn test_free_normalize_books_undated_rows_now() {
        let before = Utc::now();
        let mut raw = RawRevenueRecord::new("not-a-date", 9.0, "usd");
        raw.id = Some("r-9".to_string());
        let out = normalize(&[raw]);
        let after = Utc::now();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id.as_deref(), Some("r-9"));
        assert!(out[0].date >= before && out[0].date <= after);
        assert_eq!(out[0].month, out[0].date.format("%Y-%m").to_string());
    }

    #[test]
    fn test_offset_dates_are_converted_to_utc() {
        let out = normalize(&[RawRevenueRecord::new("2025-01-31T22:00:00-05:00", 1.0, "usd")]);
        assert_eq!(out[0].month, "2025-02");
    }

    #[test]
    fn test_fallback_policy_books_at_now() {
        let raw = RawRevenueRecord::new("not a date", 10.0, "usd");
        let out = Normalizer::default().normalize(&[raw], fixed_now()).unwrap();
        assert_eq!(out[0].date, fixed_now());
        assert_eq!(out[0].month, "2026-03");
    }

    #[test]
    fn test_reject_policy_fails_batch() {
        let good = RawRevenueRecord::new("2025-01-05", 100.0, "usd");
        let mut missing = good.clone();
        missing.date = None;
        let normalizer = Normalizer::new(DatePolicy::Reject, DEFAULT_CURRENCY);
        let err = normalizer.normalize(&[good, missing], fixed_now()).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::InvalidRecordDate { position: 1, value: "<missing>".to_string() }
        );
    }

    #[test]
    fn test_raw_record_deserializes_both_date_forms() {
        let rows: Vec<RawRevenueRecord> = serde_json::from_str(
            r#"[{"amount": 1.5, "date": "2025-01-05"}, {"amount": -2, "date": 1700000000, "currency": "usd"}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].date, Some(RawDate::Text("2025-01-05".to_string())));
        assert_eq!(rows[1].date, Some(RawDate::Timestamp(1_700_000_000)));
        assert_eq!(rows[1].amount, -2.0);
    }
}
