//! Leaderboard timeframes and paging limits.
//!
//! Rankings are ordered by total points descending, ties broken by the
//! lowest `user_id`.

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

pub const TIMEFRAME_ALL_TIME: &str = "all_time";
pub const TIMEFRAME_THIS_WEEK: &str = "this_week";
pub const TIMEFRAME_THIS_MONTH: &str = "this_month";

pub const VALID_TIMEFRAMES: &[&str] = &[TIMEFRAME_ALL_TIME, TIMEFRAME_THIS_WEEK, TIMEFRAME_THIS_MONTH];

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    AllTime,
    ThisWeek,
    ThisMonth,
}

impl Timeframe {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            TIMEFRAME_ALL_TIME => Ok(Self::AllTime),
            TIMEFRAME_THIS_WEEK => Ok(Self::ThisWeek),
            TIMEFRAME_THIS_MONTH => Ok(Self::ThisMonth),
            _ => Err(CoreError::Validation(format!(
                "Invalid timeframe '{s}'. Must be one of: {}",
                VALID_TIMEFRAMES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllTime => TIMEFRAME_ALL_TIME,
            Self::ThisWeek => TIMEFRAME_THIS_WEEK,
            Self::ThisMonth => TIMEFRAME_THIS_MONTH,
        }
    }

    /// Half-open `[start, end)` window on `earned_at` containing `now`, or
    /// `None` for all-time.
    ///
    /// Weeks start on Monday 00:00 UTC; months are calendar months in UTC.
    pub fn window(&self, now: Timestamp) -> Option<(Timestamp, Timestamp)> {
        let today = now.date_naive();
        match self {
            Self::AllTime => None,
            Self::ThisWeek => {
                let monday =
                    today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                let start = start_of_day(monday);
                Some((start, start + Duration::days(7)))
            }
            Self::ThisMonth => {
                let first = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?;
                let next = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
                };
                Some((start_of_day(first), start_of_day(next)))
            }
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::AllTime
    }
}

fn start_of_day(date: NaiveDate) -> Timestamp {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// Clamp a requested page size to `1..=MAX_LIMIT`, defaulting to
/// [`DEFAULT_LIMIT`].
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}
