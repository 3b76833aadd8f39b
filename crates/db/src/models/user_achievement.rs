//! Per-user achievement ledger entities.

use engagement_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_achievements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAchievement {
    pub user_achievement_id: DbId,
    pub user_id: DbId,
    pub achievement_id: DbId,
    pub progress_percentage: f64,
    pub is_completed: bool,
    pub earned_at: Option<Timestamp>,
    pub notification_sent: bool,
    pub seen_at: Option<Timestamp>,
    pub points_earned: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A ledger row joined with its catalog entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAchievementDetail {
    pub user_achievement_id: DbId,
    pub user_id: DbId,
    pub achievement_id: DbId,
    pub progress_percentage: f64,
    pub is_completed: bool,
    pub earned_at: Option<Timestamp>,
    pub seen_at: Option<Timestamp>,
    pub notification_sent: bool,
    pub points_earned: i32,
    pub achievement_name: String,
    pub description: Option<String>,
    pub achievement_type: String,
    pub rarity_level: String,
    pub badge_icon: Option<String>,
    pub badge_color: Option<String>,
    pub points_value: i32,
}

/// One active catalog entry with the user's progress against it.
///
/// Achievements the user has never touched report zero progress.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AchievementProgress {
    pub achievement_id: DbId,
    pub achievement_name: String,
    pub description: Option<String>,
    pub achievement_type: String,
    pub rarity_level: String,
    pub points_value: i32,
    pub badge_icon: Option<String>,
    pub badge_color: Option<String>,
    pub progress_percentage: f64,
    pub is_completed: bool,
    pub earned_at: Option<Timestamp>,
    pub points_earned: i32,
}

/// Points earned by a user, grouped by catalog rarity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RarityPoints {
    pub rarity_level: String,
    pub points: i64,
}
