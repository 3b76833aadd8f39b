use engagement_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Aggregated points for one user over completed achievements.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaderboardRow {
    pub user_id: DbId,
    pub total_points: i64,
    pub total_achievements: i64,
}
