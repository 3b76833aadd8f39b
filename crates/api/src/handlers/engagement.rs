//! Engagement analytics: daily metrics, per-user stats and the leaderboard.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use engagement_core::engagement::{
    average_score, current_streak, engagement_score, MotivationLevel, RECENT_METRICS_DAYS,
};
use engagement_core::leaderboard::{clamp_limit, Timeframe};
use engagement_core::types::DbId;
use engagement_db::models::engagement_metric::{EngagementMetric, UpsertEngagementMetric};
use engagement_db::repositories::{EngagementMetricRepo, LeaderboardRepo, UserAchievementRepo};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::AppResult;
use crate::extract::{ApiPath, ApiQuery, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::query::LeaderboardParams;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct TrackMetricsRequest {
    #[validate(range(min = 1, message = "The user id must be a positive integer."))]
    pub user_id: DbId,
    /// Defaults to today (UTC).
    pub metric_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "The session count must be at least 0."))]
    pub session_count: Option<i32>,
    #[validate(range(min = 0, message = "The session duration must be at least 0."))]
    pub total_session_duration_minutes: Option<i32>,
    #[validate(range(min = 0, message = "The achievements earned must be at least 0."))]
    pub achievements_earned: Option<i32>,
    #[validate(range(min = 0, message = "The points earned must be at least 0."))]
    pub points_earned: Option<i32>,
    #[validate(range(min = 0, message = "The notification interactions must be at least 0."))]
    pub notification_interactions: Option<i32>,
    #[validate(custom(function = "feature_usage_field"))]
    pub feature_usage_json: Option<serde_json::Value>,
    #[validate(custom(function = "motivation_field"))]
    pub motivation_level: Option<String>,
}

fn feature_usage_field(value: &serde_json::Value) -> Result<(), ValidationError> {
    if value.is_object() || value.is_array() {
        Ok(())
    } else {
        Err(ValidationError::new("feature_usage_json")
            .with_message("The feature usage must be an object or array.".into()))
    }
}

fn motivation_field(level: &str) -> Result<(), ValidationError> {
    MotivationLevel::from_str_value(level).map(|_| ()).map_err(|e| {
        ValidationError::new("motivation_level").with_message(e.to_string().into())
    })
}

impl TrackMetricsRequest {
    fn into_upsert(self, today: NaiveDate) -> UpsertEngagementMetric {
        let session_count = self.session_count.unwrap_or(0);
        let achievements_earned = self.achievements_earned.unwrap_or(0);
        let notification_interactions = self.notification_interactions.unwrap_or(0);
        let motivation = self
            .motivation_level
            .as_deref()
            .and_then(|m| MotivationLevel::from_str_value(m).ok())
            .unwrap_or_default();

        UpsertEngagementMetric {
            user_id: self.user_id,
            metric_date: self.metric_date.unwrap_or(today),
            session_count,
            total_session_duration_minutes: self.total_session_duration_minutes.unwrap_or(0),
            achievements_earned,
            points_earned: self.points_earned.unwrap_or(0),
            notification_interactions,
            feature_usage_json: self.feature_usage_json,
            engagement_score: engagement_score(
                session_count,
                achievements_earned,
                notification_interactions,
            ),
            motivation_level: motivation.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserStatsSummary {
    pub user_id: DbId,
    pub total_points: i64,
    pub total_achievements: i64,
    pub average_engagement_score: f64,
    pub current_streak_days: u32,
    pub recent_metrics: Vec<EngagementMetric>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: DbId,
    pub total_points: i64,
    pub total_achievements: i64,
}

#[derive(Debug, Serialize)]
pub struct Leaderboard {
    pub timeframe: Timeframe,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// POST /api/engagement/engagement-metrics
///
/// One row per user and day. Posting again for the same day replaces the
/// counters.
pub async fn track_engagement_metrics(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<TrackMetricsRequest>,
) -> AppResult<impl IntoResponse> {
    auth.authorize_user(input.user_id)?;

    let upsert = input.into_upsert(Utc::now().date_naive());
    let metric = EngagementMetricRepo::upsert(&state.pool, &upsert).await?;

    tracing::debug!(
        user_id = metric.user_id,
        metric_date = %metric.metric_date,
        engagement_score = metric.engagement_score,
        "Engagement metrics recorded",
    );

    Ok(Json(
        ApiResponse::ok(metric).with_message("Engagement metrics tracked successfully"),
    ))
}

/// GET /api/engagement/user-stats/{user_id}
pub async fn get_user_stats(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.authorize_user(user_id)?;

    let recent_metrics = EngagementMetricRepo::recent(&state.pool, user_id, RECENT_METRICS_DAYS).await?;
    let total_points = UserAchievementRepo::total_points(&state.pool, user_id).await?;
    let total_achievements = UserAchievementRepo::completed_count(&state.pool, user_id).await?;
    let active_days = EngagementMetricRepo::active_days_desc(&state.pool, user_id).await?;

    let scores: Vec<f64> = recent_metrics.iter().map(|m| m.engagement_score).collect();

    Ok(Json(ApiResponse::ok(UserStatsSummary {
        user_id,
        total_points,
        total_achievements,
        average_engagement_score: average_score(&scores),
        current_streak_days: current_streak(&active_days, Utc::now().date_naive()),
        recent_metrics,
    })))
}

/// GET /api/engagement/leaderboard?timeframe=all_time&limit=10
pub async fn get_leaderboard(
    _auth: AuthUser,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LeaderboardParams>,
) -> AppResult<impl IntoResponse> {
    let timeframe = params
        .timeframe
        .as_deref()
        .map(Timeframe::from_str_value)
        .transpose()?
        .unwrap_or_default();
    let limit = clamp_limit(params.limit);

    let rows = LeaderboardRepo::top(&state.pool, timeframe.window(Utc::now()), limit).await?;
    let leaderboard = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| LeaderboardEntry {
            rank: i + 1,
            user_id: row.user_id,
            total_points: row.total_points,
            total_achievements: row.total_achievements,
        })
        .collect();

    Ok(Json(ApiResponse::ok(Leaderboard {
        timeframe,
        leaderboard,
    })))
}
