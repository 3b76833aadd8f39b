//! Achievement catalog vocabulary and catalog-entry validation.
//!
//! Achievement kinds and rarity levels are stored as text columns; these
//! enums are the typed view used by evaluation and the admin write path.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const KIND_WORKOUT_COUNT: &str = "workout_count";
pub const KIND_STREAK: &str = "streak";
pub const KIND_CALORIES: &str = "calories";
pub const KIND_TIME: &str = "time";
pub const KIND_SOCIAL: &str = "social";
pub const KIND_SPECIAL: &str = "special";

/// All valid achievement kind strings.
pub const VALID_KINDS: &[&str] = &[
    KIND_WORKOUT_COUNT,
    KIND_STREAK,
    KIND_CALORIES,
    KIND_TIME,
    KIND_SOCIAL,
    KIND_SPECIAL,
];

pub const RARITY_COMMON: &str = "common";
pub const RARITY_RARE: &str = "rare";
pub const RARITY_EPIC: &str = "epic";
pub const RARITY_LEGENDARY: &str = "legendary";

/// All valid rarity strings, in ascending order of rarity.
pub const VALID_RARITIES: &[&str] = &[RARITY_COMMON, RARITY_RARE, RARITY_EPIC, RARITY_LEGENDARY];

/// Maximum length of an achievement name (matches the column width).
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of a badge icon reference.
pub const MAX_BADGE_ICON_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which user statistic an achievement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    WorkoutCount,
    Streak,
    Calories,
    Time,
    Social,
    Special,
}

impl AchievementKind {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            KIND_WORKOUT_COUNT => Ok(Self::WorkoutCount),
            KIND_STREAK => Ok(Self::Streak),
            KIND_CALORIES => Ok(Self::Calories),
            KIND_TIME => Ok(Self::Time),
            KIND_SOCIAL => Ok(Self::Social),
            KIND_SPECIAL => Ok(Self::Special),
            _ => Err(CoreError::Validation(format!(
                "Invalid achievement type '{s}'. Must be one of: {}",
                VALID_KINDS.join(", ")
            ))),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkoutCount => KIND_WORKOUT_COUNT,
            Self::Streak => KIND_STREAK,
            Self::Calories => KIND_CALORIES,
            Self::Time => KIND_TIME,
            Self::Social => KIND_SOCIAL,
            Self::Special => KIND_SPECIAL,
        }
    }
}

/// Badge rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            RARITY_COMMON => Ok(Self::Common),
            RARITY_RARE => Ok(Self::Rare),
            RARITY_EPIC => Ok(Self::Epic),
            RARITY_LEGENDARY => Ok(Self::Legendary),
            _ => Err(CoreError::Validation(format!(
                "Invalid rarity level '{s}'. Must be one of: {}",
                VALID_RARITIES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => RARITY_COMMON,
            Self::Rare => RARITY_RARE,
            Self::Epic => RARITY_EPIC,
            Self::Legendary => RARITY_LEGENDARY,
        }
    }
}

impl Default for Rarity {
    fn default() -> Self {
        Self::Common
    }
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate an achievement display name: non-blank, at most
/// [`MAX_NAME_LENGTH`] characters.
pub fn validate_achievement_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "achievement_name must not be empty".to_string(),
        ));
    }
    let len = name.chars().count();
    if len > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "achievement_name must be at most {MAX_NAME_LENGTH} characters, got {len}"
        )));
    }
    Ok(())
}

/// Points awarded for an achievement can never be negative.
pub fn validate_points_value(points: i32) -> Result<(), CoreError> {
    if points < 0 {
        return Err(CoreError::Validation(format!(
            "points_value must be non-negative, got {points}"
        )));
    }
    Ok(())
}

/// Validate that a badge color is a `#RRGGBB` hex string (the column is
/// seven characters wide).
pub fn validate_badge_color(color: &str) -> Result<(), CoreError> {
    let Some(hex) = color.strip_prefix('#') else {
        return Err(CoreError::Validation(format!(
            "Invalid badge_color '{color}'. Must start with '#'"
        )));
    };
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::Validation(format!(
            "Invalid badge_color '{color}'. Must be in #RRGGBB hex format"
        )));
    }
    Ok(())
}

pub fn validate_badge_icon(icon: &str) -> Result<(), CoreError> {
    if icon.len() > MAX_BADGE_ICON_LENGTH {
        return Err(CoreError::Validation(format!(
            "badge_icon must be at most {MAX_BADGE_ICON_LENGTH} bytes"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
