//! Typed achievement criteria and the criteria evaluator.
//!
//! Criteria are stored as a JSON object whose shape depends on the
//! achievement kind. [`AchievementCriteria::parse`] turns that payload into
//! a tagged union and is strict: it is used when catalog entries are written.
//! [`evaluate_stored`] is the read path and treats any payload that fails to
//! parse as "never met", so a malformed catalog row can not unlock anything.
//!
//! Evaluation is pure. Every threshold comparison is `>=`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::achievement::AchievementKind;
use crate::error::CoreError;

/// Discriminator value marking a special achievement as a level tier entry.
pub const LEVEL_PROGRESSION: &str = "level_progression";

pub const LEVEL_BEGINNER: &str = "beginner";
pub const LEVEL_INTERMEDIATE: &str = "intermediate";
pub const LEVEL_ADVANCED: &str = "advanced";

pub const VALID_LEVELS: &[&str] = &[LEVEL_BEGINNER, LEVEL_INTERMEDIATE, LEVEL_ADVANCED];

// ---------------------------------------------------------------------------
// User statistics snapshot
// ---------------------------------------------------------------------------

/// Counters fetched from the tracking service for one user.
///
/// `Default` is the all-zero snapshot used when the tracking service is
/// unreachable; with zeroed counters no threshold achievement can unlock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_workouts: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub total_calories: i64,
    pub total_minutes: i64,
    pub group_workouts: i64,
    pub this_week_sessions: i64,
}

// ---------------------------------------------------------------------------
// Level tiers
// ---------------------------------------------------------------------------

/// Fitness level tiers that each map to one special achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl LevelTier {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            LEVEL_BEGINNER => Ok(Self::Beginner),
            LEVEL_INTERMEDIATE => Ok(Self::Intermediate),
            LEVEL_ADVANCED => Ok(Self::Advanced),
            _ => Err(CoreError::Validation(format!(
                "Invalid level '{s}'. Must be one of: {}",
                VALID_LEVELS.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => LEVEL_BEGINNER,
            Self::Intermediate => LEVEL_INTERMEDIATE,
            Self::Advanced => LEVEL_ADVANCED,
        }
    }
}

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// Sub-cases of the `special` achievement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCriteria {
    /// Unlocked by the first completed workout.
    FirstWorkout,
    /// Unlocked explicitly when the user reaches a level tier.
    LevelProgression { level: LevelTier },
    /// Only unlocked by a direct server-to-server award.
    Manual,
}

/// Parsed criteria, one variant per achievement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementCriteria {
    WorkoutCount { target_count: i64 },
    Streak { target_streak: i64 },
    Calories { target_calories: i64 },
    Time { target_minutes: i64 },
    Social { target_group_workouts: i64 },
    Special(SpecialCriteria),
}

#[derive(Deserialize)]
struct WorkoutCountParams {
    #[serde(alias = "workout_count")]
    target_count: i64,
}

#[derive(Deserialize)]
struct StreakParams {
    #[serde(alias = "streak_days")]
    target_streak: i64,
}

#[derive(Deserialize)]
struct CaloriesParams {
    #[serde(alias = "calories_burned")]
    target_calories: i64,
}

#[derive(Deserialize)]
struct TimeParams {
    #[serde(alias = "total_minutes")]
    target_minutes: i64,
}

#[derive(Deserialize)]
struct SocialParams {
    #[serde(alias = "group_workouts")]
    target_group_workouts: i64,
}

impl AchievementCriteria {
    /// Parse a criteria payload for the given kind.
    ///
    /// Rejects non-object payloads, missing or non-integer targets, negative
    /// targets, and level-progression entries with an unknown level.
    pub fn parse(kind: AchievementKind, criteria: &Value) -> Result<Self, CoreError> {
        if !criteria.is_object() {
            return Err(CoreError::Validation(
                "criteria_json must be a JSON object".to_string(),
            ));
        }

        let parsed = match kind {
            AchievementKind::WorkoutCount => {
                let p: WorkoutCountParams = decode(kind, criteria)?;
                Self::WorkoutCount {
                    target_count: non_negative("target_count", p.target_count)?,
                }
            }
            AchievementKind::Streak => {
                let p: StreakParams = decode(kind, criteria)?;
                Self::Streak {
                    target_streak: non_negative("target_streak", p.target_streak)?,
                }
            }
            AchievementKind::Calories => {
                let p: CaloriesParams = decode(kind, criteria)?;
                Self::Calories {
                    target_calories: non_negative("target_calories", p.target_calories)?,
                }
            }
            AchievementKind::Time => {
                let p: TimeParams = decode(kind, criteria)?;
                Self::Time {
                    target_minutes: non_negative("target_minutes", p.target_minutes)?,
                }
            }
            AchievementKind::Social => {
                let p: SocialParams = decode(kind, criteria)?;
                Self::Social {
                    target_group_workouts: non_negative(
                        "target_group_workouts",
                        p.target_group_workouts,
                    )?,
                }
            }
            AchievementKind::Special => Self::Special(parse_special(criteria)?),
        };
        Ok(parsed)
    }

    /// The kind this criteria variant belongs to.
    pub fn kind(&self) -> AchievementKind {
        match self {
            Self::WorkoutCount { .. } => AchievementKind::WorkoutCount,
            Self::Streak { .. } => AchievementKind::Streak,
            Self::Calories { .. } => AchievementKind::Calories,
            Self::Time { .. } => AchievementKind::Time,
            Self::Social { .. } => AchievementKind::Social,
            Self::Special(_) => AchievementKind::Special,
        }
    }

    /// Canonical JSON form, written to the catalog on ingestion so legacy key
    /// aliases do not persist.
    pub fn to_json(&self) -> Value {
        match self {
            Self::WorkoutCount { target_count } => json!({ "target_count": target_count }),
            Self::Streak { target_streak } => json!({ "target_streak": target_streak }),
            Self::Calories { target_calories } => json!({ "target_calories": target_calories }),
            Self::Time { target_minutes } => json!({ "target_minutes": target_minutes }),
            Self::Social {
                target_group_workouts,
            } => json!({ "target_group_workouts": target_group_workouts }),
            Self::Special(SpecialCriteria::FirstWorkout) => json!({ "first_workout": true }),
            Self::Special(SpecialCriteria::LevelProgression { level }) => {
                json!({ "type": LEVEL_PROGRESSION, "level": level.as_str() })
            }
            Self::Special(SpecialCriteria::Manual) => json!({}),
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(
    kind: AchievementKind,
    criteria: &Value,
) -> Result<T, CoreError> {
    T::deserialize(criteria).map_err(|e| {
        CoreError::Validation(format!(
            "Invalid criteria_json for '{}' achievement: {e}",
            kind.as_str()
        ))
    })
}

fn non_negative(field: &str, value: i64) -> Result<i64, CoreError> {
    if value < 0 {
        return Err(CoreError::Validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    Ok(value)
}

fn parse_special(criteria: &Value) -> Result<SpecialCriteria, CoreError> {
    if criteria.get("type").and_then(Value::as_str) == Some(LEVEL_PROGRESSION) {
        let level = criteria
            .get("level")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CoreError::Validation(
                    "level_progression criteria requires a string 'level'".to_string(),
                )
            })?;
        return Ok(SpecialCriteria::LevelProgression {
            level: LevelTier::from_str_value(level)?,
        });
    }

    if criteria.get("first_workout").and_then(Value::as_bool) == Some(true) {
        return Ok(SpecialCriteria::FirstWorkout);
    }

    Ok(SpecialCriteria::Manual)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Decide whether `stats` satisfies `criteria`.
///
/// Level-progression and manual special achievements are never met here;
/// they are unlocked through their own explicit triggers.
pub fn evaluate(criteria: &AchievementCriteria, stats: &UserStats) -> bool {
    match *criteria {
        AchievementCriteria::WorkoutCount { target_count } => stats.total_workouts >= target_count,
        AchievementCriteria::Streak { target_streak } => stats.current_streak >= target_streak,
        AchievementCriteria::Calories { target_calories } => {
            stats.total_calories >= target_calories
        }
        AchievementCriteria::Time { target_minutes } => stats.total_minutes >= target_minutes,
        AchievementCriteria::Social {
            target_group_workouts,
        } => stats.group_workouts >= target_group_workouts,
        AchievementCriteria::Special(SpecialCriteria::FirstWorkout) => stats.total_workouts >= 1,
        AchievementCriteria::Special(_) => false,
    }
}

/// Evaluate a catalog row as stored (kind string + raw criteria JSON).
///
/// An unknown kind or a payload that fails [`AchievementCriteria::parse`]
/// evaluates to `false`.
pub fn evaluate_stored(kind: &str, criteria: &Value, stats: &UserStats) -> bool {
    let parsed = AchievementKind::from_str_value(kind)
        .and_then(|kind| AchievementCriteria::parse(kind, criteria));

    match parsed {
        Ok(criteria) => evaluate(&criteria, stats),
        Err(e) => {
            tracing::warn!(kind, error = %e, "Stored achievement criteria is unusable, treating as unmet");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
