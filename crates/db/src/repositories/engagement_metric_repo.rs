//! Repository for the `engagement_metrics` table.

use chrono::NaiveDate;
use engagement_core::types::DbId;
use sqlx::PgPool;

use crate::models::engagement_metric::{EngagementMetric, UpsertEngagementMetric};

const COLUMNS: &str = "metric_id, user_id, metric_date, session_count, \
     total_session_duration_minutes, achievements_earned, points_earned, \
     notification_interactions, feature_usage_json, \
     engagement_score::FLOAT8 AS engagement_score, motivation_level, created_at, updated_at";

pub struct EngagementMetricRepo;

impl EngagementMetricRepo {
    /// Insert or replace the metrics row for `(user_id, metric_date)`.
    ///
    /// A second write on the same day overwrites the counters rather than
    /// adding to them.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertEngagementMetric,
    ) -> Result<EngagementMetric, sqlx::Error> {
        let query = format!(
            "INSERT INTO engagement_metrics \
                 (user_id, metric_date, session_count, total_session_duration_minutes, \
                  achievements_earned, points_earned, notification_interactions, \
                  feature_usage_json, engagement_score, motivation_level) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (user_id, metric_date) DO UPDATE SET \
                 session_count = EXCLUDED.session_count, \
                 total_session_duration_minutes = EXCLUDED.total_session_duration_minutes, \
                 achievements_earned = EXCLUDED.achievements_earned, \
                 points_earned = EXCLUDED.points_earned, \
                 notification_interactions = EXCLUDED.notification_interactions, \
                 feature_usage_json = EXCLUDED.feature_usage_json, \
                 engagement_score = EXCLUDED.engagement_score, \
                 motivation_level = EXCLUDED.motivation_level, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EngagementMetric>(&query)
            .bind(input.user_id)
            .bind(input.metric_date)
            .bind(input.session_count)
            .bind(input.total_session_duration_minutes)
            .bind(input.achievements_earned)
            .bind(input.points_earned)
            .bind(input.notification_interactions)
            .bind(&input.feature_usage_json)
            .bind(input.engagement_score)
            .bind(&input.motivation_level)
            .fetch_one(pool)
            .await
    }

    /// The most recent `limit` days of metrics, newest first.
    pub async fn recent(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<EngagementMetric>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM engagement_metrics \
             WHERE user_id = $1 \
             ORDER BY metric_date DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, EngagementMetric>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Dates with at least one session, newest first.
    pub async fn active_days_desc(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<NaiveDate>, sqlx::Error> {
        sqlx::query_scalar::<_, NaiveDate>(
            "SELECT metric_date FROM engagement_metrics \
             WHERE user_id = $1 AND session_count > 0 \
             ORDER BY metric_date DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
