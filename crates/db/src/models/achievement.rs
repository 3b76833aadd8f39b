//! Achievement catalog entity and DTOs.

use engagement_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `achievements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Achievement {
    pub achievement_id: DbId,
    pub achievement_name: String,
    pub description: Option<String>,
    pub achievement_type: String,
    pub criteria_json: serde_json::Value,
    pub points_value: i32,
    pub badge_icon: Option<String>,
    pub badge_color: Option<String>,
    pub rarity_level: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a catalog entry.
///
/// `criteria_json` is expected to be validated and normalised by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAchievement {
    pub achievement_name: String,
    pub description: Option<String>,
    pub achievement_type: String,
    pub criteria_json: serde_json::Value,
    pub points_value: Option<i32>,
    pub badge_icon: Option<String>,
    pub badge_color: Option<String>,
    pub rarity_level: Option<String>,
    pub is_active: Option<bool>,
}

/// DTO for patching a catalog entry. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAchievement {
    pub achievement_name: Option<String>,
    pub description: Option<String>,
    pub criteria_json: Option<serde_json::Value>,
    pub points_value: Option<i32>,
    pub badge_icon: Option<String>,
    pub badge_color: Option<String>,
    pub rarity_level: Option<String>,
    pub is_active: Option<bool>,
}
