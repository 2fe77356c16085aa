//! # Date Utilities
//!
//! Strict ISO calendar-date parsing and the day-count conventions used by
//! the proration calculator.
//!
//! ## Day-Count Conventions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  actual_365 / actual_360                                                │
//! │  ───────────────────────                                                │
//! │  Days between two dates = actual calendar-day difference.              │
//! │  The 365 vs 360 distinction changes the rate base in interest          │
//! │  formulas elsewhere; it does NOT change day counting here.             │
//! │                                                                         │
//! │  30_360 (US convention)                                                │
//! │  ──────────────────────                                                │
//! │  Every month counts as 30 days, a year as 360.                         │
//! │  • a start day of 31 clamps to 30                                      │
//! │  • an end day of 31 clamps to 30 only when the start day is >= 30      │
//! │  days = 360*Δyears + 30*Δmonths + Δdays                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{EngineError, EngineResult};

// =============================================================================
// ISO Date Parsing
// =============================================================================

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// Both the syntax and the calendar are checked: `2024-02-30` fails even
/// though it matches the pattern.
///
/// ## Example
/// ```rust
/// use closewise_core::dates::parse_iso_date;
///
/// assert!(parse_iso_date("2024-06-15").is_ok());
/// assert!(parse_iso_date("06/15/2024").is_err());
/// assert!(parse_iso_date("2024-02-30").is_err());
/// ```
pub fn parse_iso_date(input: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| EngineError::InvalidDate {
        input: input.to_string(),
    })
}

// =============================================================================
// Day Count
// =============================================================================

/// The rule for counting days between two dates in proration arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DayCount {
    /// Actual calendar days over a 365-day year.
    #[serde(rename = "actual_365")]
    Actual365,

    /// Actual calendar days over a 360-day year.
    #[serde(rename = "actual_360")]
    Actual360,

    /// Stylized 30-day months over a 360-day year (US convention).
    #[serde(rename = "30_360")]
    Thirty360,
}

impl DayCount {
    /// Counts the days from `start` to `end` under this convention.
    ///
    /// Negative when `end` precedes `start`; callers decide whether that is
    /// an error or a clamp.
    pub fn days_between(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        match self {
            DayCount::Actual365 | DayCount::Actual360 => (end - start).num_days(),
            DayCount::Thirty360 => {
                let start_day = (start.day() as i64).min(30);
                let end_day = if end.day() == 31 && start_day >= 30 {
                    30
                } else {
                    end.day() as i64
                };

                let year_diff = end.year() as i64 - start.year() as i64;
                let month_diff = end.month() as i64 - start.month() as i64;

                year_diff * 360 + month_diff * 30 + (end_day - start_day)
            }
        }
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayCount::Actual365 => write!(f, "actual/365"),
            DayCount::Actual360 => write!(f, "actual/360"),
            DayCount::Thirty360 => write!(f, "30/360"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
