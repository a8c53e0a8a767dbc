//! Contract with the external revenue source, plus a fixed-response double.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use super::normalize::RawRevenueRecord;
use super::period::DateRange;

/// Errors a revenue source may report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevenueSourceError {
    /// The source could not be reached or the call failed in transit.
    #[error("transport error: {0}")]
    Transport(String),

    /// The source answered with something that is not revenue data.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Provider of raw revenue rows for a date range.
///
/// An empty result is a valid answer, not an error.
#[async_trait]
pub trait RevenueSource: Send + Sync {
    /// Fetches every row booked within `range`, bounds included.
    async fn fetch(&self, range: &DateRange) -> Result<Vec<RawRevenueRecord>, RevenueSourceError>;
}

/// A revenue source that answers every fetch with the same rows.
///
/// Records calls so tests can assert on how the pipeline drove it, and can
/// be switched into a failing mode with [`StaticRevenueSource::set_fail_on_fetch`].
#[derive(Debug, Default)]
pub struct StaticRevenueSource {
    records: Vec<RawRevenueRecord>,
    fail_on_fetch: Mutex<Option<String>>,
    calls: AtomicUsize,
    last_range: Mutex<Option<DateRange>>,
}

impl StaticRevenueSource {
    /// Creates a source that returns `records` on every fetch.
    pub fn new(records: Vec<RawRevenueRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Makes subsequent fetches fail with a transport error carrying `message`.
    pub fn set_fail_on_fetch(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.fail_on_fetch.lock() {
            *guard = Some(message.into());
        }
    }

    /// Clears any previously set failure.
    pub fn clear_fail_on_fetch(&self) {
        if let Ok(mut guard) = self.fail_on_fetch.lock() {
            *guard = None;
        }
    }

    /// Number of fetches received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Range passed to the most recent fetch.
    pub fn last_range(&self) -> Option<DateRange> {
        self.last_range.lock().ok().and_then(|guard| *guard)
    }
}

#[async_trait]
impl RevenueSource for StaticRevenueSource {
    async fn fetch(&self, range: &DateRange) -> Result<Vec<RawRevenueRecord>, RevenueSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_range.lock() {
            *guard = Some(*range);
        }

        let failure = self.fail_on_fetch.lock().ok().and_then(|guard| guard.clone());
        if let Some(message) = failure {
            return Err(RevenueSourceError::Transport(message));
        }
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revenue::period::Period;

    #[tokio::test]
    async fn test_static_source_records_calls_and_failures() {
        let source = StaticRevenueSource::new(vec![RawRevenueRecord::new("2025-01-05", 1.0, "usd")]);
        let range = "2025-01".parse::<Period>().unwrap().date_range().unwrap();

        assert_eq!(source.fetch(&range).await.unwrap().len(), 1);
        assert_eq!(source.last_range(), Some(range));

        source.set_fail_on_fetch("connection reset");
        assert_eq!(
            source.fetch(&range).await,
            Err(RevenueSourceError::Transport("connection reset".to_string()))
        );
        source.clear_fail_on_fetch();
        assert!(source.fetch(&range).await.is_ok());
        assert_eq!(source.call_count(), 3);
    }
}
