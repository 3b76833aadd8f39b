use engagement_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `rewards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reward {
    pub reward_id: DbId,
    pub reward_name: String,
    pub description: Option<String>,
    pub reward_type: String,
    pub requirement_points: i32,
    pub reward_value: Option<String>,
    pub reward_icon: Option<String>,
    pub is_available: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a reward.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReward {
    pub reward_name: String,
    pub description: Option<String>,
    pub reward_type: String,
    pub requirement_points: i32,
    pub reward_value: Option<String>,
    pub reward_icon: Option<String>,
    pub is_available: Option<bool>,
}
