//! Daily engagement metrics: score arithmetic, motivation levels, and
//! activity streaks.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::progress::round2;

/// Upper bound of the daily engagement score.
pub const MAX_ENGAGEMENT_SCORE: f64 = 10.0;

const SESSION_WEIGHT: i64 = 2;
const ACHIEVEMENT_WEIGHT: i64 = 5;
const INTERACTION_WEIGHT: i64 = 1;

/// Number of most recent daily rows returned by the user-stats endpoint.
pub const RECENT_METRICS_DAYS: i64 = 30;

pub const MOTIVATION_VERY_LOW: &str = "very_low";
pub const MOTIVATION_LOW: &str = "low";
pub const MOTIVATION_MODERATE: &str = "moderate";
pub const MOTIVATION_HIGH: &str = "high";
pub const MOTIVATION_VERY_HIGH: &str = "very_high";

pub const VALID_MOTIVATION_LEVELS: &[&str] = &[
    MOTIVATION_VERY_LOW,
    MOTIVATION_LOW,
    MOTIVATION_MODERATE,
    MOTIVATION_HIGH,
    MOTIVATION_VERY_HIGH,
];

/// Self-reported motivation for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotivationLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl MotivationLevel {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            MOTIVATION_VERY_LOW => Ok(Self::VeryLow),
            MOTIVATION_LOW => Ok(Self::Low),
            MOTIVATION_MODERATE => Ok(Self::Moderate),
            MOTIVATION_HIGH => Ok(Self::High),
            MOTIVATION_VERY_HIGH => Ok(Self::VeryHigh),
            _ => Err(CoreError::Validation(format!(
                "Invalid motivation_level '{s}'. Must be one of: {}",
                VALID_MOTIVATION_LEVELS.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryLow => MOTIVATION_VERY_LOW,
            Self::Low => MOTIVATION_LOW,
            Self::Moderate => MOTIVATION_MODERATE,
            Self::High => MOTIVATION_HIGH,
            Self::VeryHigh => MOTIVATION_VERY_HIGH,
        }
    }
}

impl Default for MotivationLevel {
    fn default() -> Self {
        Self::Moderate
    }
}

/// Daily engagement score: two points per session, five per achievement,
/// one per notification interaction, capped at [`MAX_ENGAGEMENT_SCORE`].
pub fn engagement_score(
    session_count: i32,
    achievements_earned: i32,
    notification_interactions: i32,
) -> f64 {
    let raw = i64::from(session_count) * SESSION_WEIGHT
        + i64::from(achievements_earned) * ACHIEVEMENT_WEIGHT
        + i64::from(notification_interactions) * INTERACTION_WEIGHT;
    (raw as f64).clamp(0.0, MAX_ENGAGEMENT_SCORE)
}

/// Mean of the given scores with two decimals; zero for an empty slice.
pub fn average_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    round2(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Count consecutive active days ending on `today`.
///
/// `active_days_desc` must be the dates with at least one session, newest
/// first. A gap (or no activity today) ends the streak.
pub fn current_streak(active_days_desc: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut expected = today;
    let mut streak = 0;
    for day in active_days_desc {
        if *day != expected {
            break;
        }
        streak += 1;
        expected -= Duration::days(1);
    }
    streak
}
