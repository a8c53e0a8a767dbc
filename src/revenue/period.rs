//! Attestation periods and the date ranges they cover.
//!
//! A period is either a calendar month (`"2025-10"`) or a calendar quarter
//! (`"2025-Q4"`). Both resolve to an inclusive UTC range running from the
//! first second of the first day to the last second of the last day.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while resolving a period string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    /// The string is neither `YYYY-MM` nor `YYYY-Qn`.
    #[error("Invalid period '{0}': expected YYYY-MM or YYYY-Qn")]
    Malformed(String),

    /// The string has the right shape but names no real month or quarter.
    #[error("Invalid period '{period}': {reason}")]
    OutOfRange {
        /// The offending period string.
        period: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// A calendar month or quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    /// A single month, `1..=12`.
    Month {
        /// Calendar year.
        year: i32,
        /// Calendar month.
        month: u32,
    },
    /// A quarter, `1..=4`; quarter `q` spans months `3q-2..=3q`.
    Quarter {
        /// Calendar year.
        year: i32,
        /// Quarter number.
        quarter: u32,
    },
}

/// Inclusive UTC date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First instant in the range.
    pub start: DateTime<Utc>,
    /// Last instant in the range (23:59:59 on the last day).
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// `start` as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// `end` as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Whether `instant` lies inside the range, bounds included.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

impl Period {
    /// First and last calendar month covered, inclusive.
    fn month_span(&self) -> (i32, u32, u32) {
        match *self {
            Period::Month { year, month } => (year, month, month),
            Period::Quarter { year, quarter } => (year, quarter * 3 - 2, quarter * 3),
        }
    }

    /// Resolves the period into its inclusive UTC date range.
    pub fn date_range(&self) -> Result<DateRange, PeriodError> {
        let (year, first_month, last_month) = self.month_span();
        let out_of_range = || PeriodError::OutOfRange {
            period: self.to_string(),
            reason: "date is outside the supported calendar".to_string(),
        };

        let first_day = NaiveDate::from_ymd_opt(year, first_month, 1).ok_or_else(out_of_range)?;
        let last_day = NaiveDate::from_ymd_opt(year, last_month, 1)
            .and_then(|d| d.checked_add_months(Months::new(1)))
            .and_then(|d| d.pred_opt())
            .ok_or_else(out_of_range)?;

        let start = first_day.and_hms_opt(0, 0, 0).ok_or_else(out_of_range)?;
        let end = last_day.and_hms_opt(23, 59, 59).ok_or_else(out_of_range)?;

        Ok(DateRange {
            start: Utc.from_utc_datetime(&start),
            end: Utc.from_utc_datetime(&end),
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            Period::Quarter { year, quarter } => write!(f, "{:04}-Q{}", year, quarter),
        }
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PeriodError::Malformed(s.to_string());
        let (year_part, rest) = s.split_once('-').ok_or_else(malformed)?;

        if year_part.len() != 4 || !year_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let year: i32 = year_part.parse().map_err(|_| malformed())?;

        if let Some(q) = rest.strip_prefix('Q') {
            if q.len() != 1 || !q.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            let quarter: u32 = q.parse().map_err(|_| malformed())?;
            if !(1..=4).contains(&quarter) {
                return Err(PeriodError::OutOfRange {
                    period: s.to_string(),
                    reason: format!("quarter {} is not in 1..=4", quarter),
                });
            }
            return Ok(Period::Quarter { year, quarter });
        }

        if rest.len() != 2 || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let month: u32 = rest.parse().map_err(|_| malformed())?;
        if !(1..=12).contains(&month) {
            return Err(PeriodError::OutOfRange {
                period: s.to_string(),
                reason: format!("month {} is not in 1..=12", month),
            });
        }
        Ok(Period::Month { year, month })
    }
}
