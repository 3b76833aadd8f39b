//! Points leaderboard over completed achievements.

use engagement_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::leaderboard::LeaderboardRow;

pub struct LeaderboardRepo;

impl LeaderboardRepo {
    /// Top users by points earned, ties broken by lowest `user_id`.
    ///
    /// With a window, only achievements whose `earned_at` falls in
    /// `[start, end)` count.
    pub async fn top(
        pool: &PgPool,
        window: Option<(Timestamp, Timestamp)>,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        let (start, end) = match window {
            Some((start, end)) => (Some(start), Some(end)),
            None => (None, None),
        };
        sqlx::query_as::<_, LeaderboardRow>(
            "SELECT user_id, \
                    COALESCE(SUM(points_earned), 0)::BIGINT AS total_points, \
                    COUNT(*) AS total_achievements \
             FROM user_achievements \
             WHERE is_completed \
               AND ($1::TIMESTAMPTZ IS NULL OR earned_at >= $1) \
               AND ($2::TIMESTAMPTZ IS NULL OR earned_at < $2) \
             GROUP BY user_id \
             ORDER BY total_points DESC, user_id ASC \
             LIMIT $3",
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
