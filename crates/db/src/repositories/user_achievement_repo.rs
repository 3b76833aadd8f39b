//! Repository for the `user_achievements` ledger.
//!
//! Every write is an `INSERT ... ON CONFLICT (user_id, achievement_id)`
//! upsert. Writes that would complete a record carry a
//! `WHERE user_achievements.is_completed = FALSE` guard on the conflict
//! branch, so an already-completed row is never rewritten: `earned_at` and
//! `points_earned` stay as they were at the moment of completion. A guarded
//! upsert that hits a completed row returns no row.

use engagement_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user_achievement::{
    AchievementProgress, RarityPoints, UserAchievement, UserAchievementDetail,
};

/// Column list for `user_achievements` queries.
const COLUMNS: &str = "user_achievement_id, user_id, achievement_id, \
     progress_percentage::FLOAT8 AS progress_percentage, is_completed, earned_at, \
     notification_sent, seen_at, points_earned, created_at, updated_at";

/// Column list for ledger rows joined with `achievements a` (ledger aliased `ua`).
const DETAIL_COLUMNS: &str = "ua.user_achievement_id, ua.user_id, ua.achievement_id, \
     ua.progress_percentage::FLOAT8 AS progress_percentage, ua.is_completed, ua.earned_at, \
     ua.seen_at, ua.notification_sent, ua.points_earned, \
     a.achievement_name, a.description, a.achievement_type, a.rarity_level, \
     a.badge_icon, a.badge_color, a.points_value";

/// Provides the per-user achievement state transitions and read models.
pub struct UserAchievementRepo;

impl UserAchievementRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find the ledger row for a (user, achievement) pair.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        achievement_id: DbId,
    ) -> Result<Option<UserAchievement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_achievements \
             WHERE user_id = $1 AND achievement_id = $2"
        );
        sqlx::query_as::<_, UserAchievement>(&query)
            .bind(user_id)
            .bind(achievement_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the joined view of a single (user, achievement) pair.
    pub async fn find_detail(
        pool: &PgPool,
        user_id: DbId,
        achievement_id: DbId,
    ) -> Result<Option<UserAchievementDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM user_achievements ua \
             JOIN achievements a ON a.achievement_id = ua.achievement_id \
             WHERE ua.user_id = $1 AND ua.achievement_id = $2"
        );
        sqlx::query_as::<_, UserAchievementDetail>(&query)
            .bind(user_id)
            .bind(achievement_id)
            .fetch_optional(pool)
            .await
    }

    /// All ledger rows for a user with catalog data, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserAchievementDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM user_achievements ua \
             JOIN achievements a ON a.achievement_id = ua.achievement_id \
             WHERE ua.user_id = $1 \
             ORDER BY ua.updated_at DESC, ua.user_achievement_id DESC"
        );
        sqlx::query_as::<_, UserAchievementDetail>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Ids of the achievements this user has already completed.
    pub async fn completed_achievement_ids(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT achievement_id FROM user_achievements \
             WHERE user_id = $1 AND is_completed",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Completed achievements earned at or after `since`, newest first.
    pub async fn list_completed_since(
        pool: &PgPool,
        user_id: DbId,
        since: Timestamp,
    ) -> Result<Vec<UserAchievementDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM user_achievements ua \
             JOIN achievements a ON a.achievement_id = ua.achievement_id \
             WHERE ua.user_id = $1 AND ua.is_completed AND ua.earned_at >= $2 \
             ORDER BY ua.earned_at DESC, ua.user_achievement_id DESC"
        );
        sqlx::query_as::<_, UserAchievementDetail>(&query)
            .bind(user_id)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// Completed achievements the client has not acknowledged yet.
    pub async fn list_unseen(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserAchievementDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM user_achievements ua \
             JOIN achievements a ON a.achievement_id = ua.achievement_id \
             WHERE ua.user_id = $1 AND ua.is_completed AND ua.seen_at IS NULL \
             ORDER BY ua.earned_at DESC, ua.user_achievement_id DESC"
        );
        sqlx::query_as::<_, UserAchievementDetail>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Every active catalog entry with this user's progress against it.
    pub async fn progress_overview(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<AchievementProgress>, sqlx::Error> {
        sqlx::query_as::<_, AchievementProgress>(
            "SELECT a.achievement_id, a.achievement_name, a.description, a.achievement_type, \
                    a.rarity_level, a.points_value, a.badge_icon, a.badge_color, \
                    COALESCE(ua.progress_percentage, 0)::FLOAT8 AS progress_percentage, \
                    COALESCE(ua.is_completed, FALSE) AS is_completed, \
                    ua.earned_at, \
                    COALESCE(ua.points_earned, 0) AS points_earned \
             FROM achievements a \
             LEFT JOIN user_achievements ua \
                    ON ua.achievement_id = a.achievement_id AND ua.user_id = $1 \
             WHERE a.is_active \
             ORDER BY a.achievement_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Sum of `points_earned` over completed records.
    pub async fn total_points(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(points_earned), 0)::BIGINT FROM user_achievements \
             WHERE user_id = $1 AND is_completed",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn completed_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_achievements WHERE user_id = $1 AND is_completed",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Completed points grouped by the catalog rarity, rarest first.
    pub async fn points_by_rarity(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<RarityPoints>, sqlx::Error> {
        sqlx::query_as::<_, RarityPoints>(
            "SELECT a.rarity_level, COALESCE(SUM(ua.points_earned), 0)::BIGINT AS points \
             FROM user_achievements ua \
             JOIN achievements a ON a.achievement_id = ua.achievement_id \
             WHERE ua.user_id = $1 AND ua.is_completed \
             GROUP BY a.rarity_level \
             ORDER BY a.rarity_level",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // State transitions
    // -----------------------------------------------------------------------

    /// Mark a (user, achievement) pair completed with `points` awarded.
    ///
    /// Creates the row if absent, or completes an in-progress row. Returns
    /// `None` when the row was already completed; nothing is written then.
    pub async fn complete(
        pool: &PgPool,
        user_id: DbId,
        achievement_id: DbId,
        points: i32,
    ) -> Result<Option<UserAchievement>, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_achievements \
                 (user_id, achievement_id, progress_percentage, is_completed, earned_at, points_earned) \
             VALUES ($1, $2, 100, TRUE, NOW(), $3) \
             ON CONFLICT (user_id, achievement_id) DO UPDATE SET \
                 progress_percentage = 100, \
                 is_completed = TRUE, \
                 earned_at = NOW(), \
                 points_earned = EXCLUDED.points_earned, \
                 updated_at = NOW() \
             WHERE user_achievements.is_completed = FALSE \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserAchievement>(&query)
            .bind(user_id)
            .bind(achievement_id)
            .bind(points)
            .fetch_optional(pool)
            .await
    }

    /// Create a completed row only if no row exists for the pair.
    ///
    /// Returns `None` if any row (completed or not) already exists.
    pub async fn insert_completed_if_absent(
        pool: &PgPool,
        user_id: DbId,
        achievement_id: DbId,
        points: i32,
    ) -> Result<Option<UserAchievement>, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_achievements \
                 (user_id, achievement_id, progress_percentage, is_completed, earned_at, points_earned) \
             VALUES ($1, $2, 100, TRUE, NOW(), $3) \
             ON CONFLICT (user_id, achievement_id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserAchievement>(&query)
            .bind(user_id)
            .bind(achievement_id)
            .bind(points)
            .fetch_optional(pool)
            .await
    }

    /// Record progress for an in-progress (or absent) pair.
    ///
    /// `percentage` must already be validated to `[0, 100]`. Completion and
    /// `earned_at` are derived from it; `points_if_completed` is written only
    /// when this update completes the record. Returns `None` when the row was
    /// already completed; completed rows are terminal.
    pub async fn upsert_progress(
        pool: &PgPool,
        user_id: DbId,
        achievement_id: DbId,
        percentage: f64,
        points_if_completed: i32,
    ) -> Result<Option<UserAchievement>, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_achievements \
                 (user_id, achievement_id, progress_percentage, is_completed, earned_at, points_earned) \
             VALUES ( \
                 $1, $2, $3, \
                 $3 >= 100, \
                 CASE WHEN $3 >= 100 THEN NOW() END, \
                 CASE WHEN $3 >= 100 THEN $4 ELSE 0 END) \
             ON CONFLICT (user_id, achievement_id) DO UPDATE SET \
                 progress_percentage = EXCLUDED.progress_percentage, \
                 is_completed = EXCLUDED.is_completed, \
                 earned_at = EXCLUDED.earned_at, \
                 points_earned = EXCLUDED.points_earned, \
                 updated_at = NOW() \
             WHERE user_achievements.is_completed = FALSE \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserAchievement>(&query)
            .bind(user_id)
            .bind(achievement_id)
            .bind(percentage)
            .bind(points_if_completed)
            .fetch_optional(pool)
            .await
    }

    /// Stamp `seen_at` on the given completed records owned by `user_id`.
    ///
    /// Ids that belong to other users, are not completed, or were already
    /// seen are ignored. Returns the number of rows updated.
    pub async fn mark_seen(
        pool: &PgPool,
        user_id: DbId,
        user_achievement_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_achievements SET seen_at = NOW(), updated_at = NOW() \
             WHERE user_id = $1 \
               AND user_achievement_id = ANY($2) \
               AND is_completed \
               AND seen_at IS NULL",
        )
        .bind(user_id)
        .bind(user_achievement_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Record that the comms service acknowledged the unlock notification.
    pub async fn mark_notification_sent(
        pool: &PgPool,
        user_id: DbId,
        achievement_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_achievements SET notification_sent = TRUE, updated_at = NOW() \
             WHERE user_id = $1 AND achievement_id = $2 AND is_completed",
        )
        .bind(user_id)
        .bind(achievement_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
