//! Daily engagement metric entity and upsert input.

use chrono::NaiveDate;
use engagement_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `engagement_metrics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EngagementMetric {
    pub metric_id: DbId,
    pub user_id: DbId,
    pub metric_date: NaiveDate,
    pub session_count: i32,
    pub total_session_duration_minutes: i32,
    pub achievements_earned: i32,
    pub points_earned: i32,
    pub notification_interactions: i32,
    pub feature_usage_json: Option<serde_json::Value>,
    pub engagement_score: f64,
    pub motivation_level: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fully resolved values for one day's metrics row.
///
/// Defaults and the derived score are filled in by the caller.
#[derive(Debug, Clone)]
pub struct UpsertEngagementMetric {
    pub user_id: DbId,
    pub metric_date: NaiveDate,
    pub session_count: i32,
    pub total_session_duration_minutes: i32,
    pub achievements_earned: i32,
    pub points_earned: i32,
    pub notification_interactions: i32,
    pub feature_usage_json: Option<serde_json::Value>,
    pub engagement_score: f64,
    pub motivation_level: String,
}
