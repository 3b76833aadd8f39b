//! Handlers for the user achievement ledger and unlock flows.
//!
//! Every handler that names a user checks ownership with
//! [`AuthUser::authorize_user`] before touching storage.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use engagement_core::criteria::{LevelTier, VALID_LEVELS};
use engagement_core::progress::completion_percentage;
use engagement_core::types::DbId;
use engagement_db::models::achievement::Achievement;
use engagement_db::models::user_achievement::{AchievementProgress, UserAchievement};
use engagement_db::repositories::{AchievementRepo, UserAchievementRepo};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::engine::{CheckOutcome, LevelUnlock};
use crate::error::AppResult;
use crate::extract::{ApiPath, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Window used by the "recent achievements" listing.
const RECENT_WINDOW_MINUTES: i64 = 60;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct UnlockAchievementRequest {
    #[validate(range(min = 1, message = "The user id must be a positive integer."))]
    pub user_id: DbId,
    #[validate(range(min = 1, message = "The achievement id must be a positive integer."))]
    pub achievement_id: DbId,
    #[validate(range(
        min = 0.0,
        max = 100.0,
        message = "The progress percentage must be between 0 and 100."
    ))]
    pub progress_percentage: Option<f64>,
    #[validate(range(min = 0, message = "The points earned must be at least 0."))]
    pub points_earned: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProgressRequest {
    #[validate(range(min = 1, message = "The achievement id must be a positive integer."))]
    pub achievement_id: DbId,
    #[validate(range(
        min = 0.0,
        max = 100.0,
        message = "The progress percentage must be between 0 and 100."
    ))]
    pub progress_percentage: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckAchievementsRequest {
    #[validate(range(min = 1, message = "The user id must be a positive integer."))]
    pub user_id: DbId,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MarkSeenRequest {
    #[validate(length(min = 1, message = "At least one user achievement id is required."))]
    pub user_achievement_ids: Vec<DbId>,
    /// Defaults to the caller.
    pub user_id: Option<DbId>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UnlockLevelRequest {
    #[validate(range(min = 1, message = "The user id must be a positive integer."))]
    pub user_id: DbId,
    #[validate(custom(function = "validate_level_field"))]
    pub level: String,
}

fn validate_level_field(level: &str) -> Result<(), ValidationError> {
    if VALID_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(ValidationError::new("level").with_message(
            format!("The level must be one of: {}.", VALID_LEVELS.join(", ")).into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ProgressStats {
    pub total_achievements: usize,
    pub completed_achievements: usize,
    pub in_progress_achievements: usize,
    pub completion_percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct ProgressOverview {
    pub user_id: DbId,
    pub stats: ProgressStats,
    pub achievements: Vec<AchievementProgress>,
}

#[derive(Debug, Serialize)]
pub struct UserPoints {
    pub user_id: DbId,
    pub total_points: i64,
    pub points_breakdown: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct MarkSeenResult {
    pub marked: u64,
}

#[derive(Debug, Serialize)]
pub struct LevelUnlockResult {
    pub level: &'static str,
    pub already_unlocked: bool,
    pub achievement: Achievement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_achievement: Option<UserAchievement>,
}

// ---------------------------------------------------------------------------
// Ledger reads
// ---------------------------------------------------------------------------

/// GET /api/engagement/achievements/{user_id}
pub async fn get_user_achievements(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.authorize_user(user_id)?;
    let records = UserAchievementRepo::list_for_user(&state.pool, user_id).await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// GET /api/engagement/available-achievements
///
/// Active catalog entries. Any authenticated caller may list them.
pub async fn get_available_achievements(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Achievement>>>> {
    let catalog = AchievementRepo::list_active(&state.pool).await?;
    Ok(Json(ApiResponse::ok(catalog)))
}

/// GET /api/engagement/achievement-progress/{user_id}
pub async fn get_achievement_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<ProgressOverview>>> {
    auth.authorize_user(user_id)?;
    let achievements = UserAchievementRepo::progress_overview(&state.pool, user_id).await?;

    let total = achievements.len();
    let completed = achievements.iter().filter(|a| a.is_completed).count();
    let in_progress = achievements
        .iter()
        .filter(|a| !a.is_completed && a.progress_percentage > 0.0)
        .count();

    Ok(Json(ApiResponse::ok(ProgressOverview {
        user_id,
        stats: ProgressStats {
            total_achievements: total,
            completed_achievements: completed,
            in_progress_achievements: in_progress,
            completion_percentage: completion_percentage(completed as i64, total as i64),
        },
        achievements,
    })))
}

/// GET /api/engagement/achievements/{user_id}/recent
///
/// Achievements completed within the last hour, newest first.
pub async fn get_recent_achievements(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.authorize_user(user_id)?;
    let since = Utc::now() - Duration::minutes(RECENT_WINDOW_MINUTES);
    let records = UserAchievementRepo::list_completed_since(&state.pool, user_id, since).await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// GET /api/engagement/achievements/{user_id}/unseen
///
/// Unlocks the beginner level achievement on first visit, then lists
/// completed achievements the user has not acknowledged yet.
pub async fn get_unseen_achievements(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.authorize_user(user_id)?;
    state
        .engine
        .ensure_beginner_unlocked(user_id, Some(&auth.token))
        .await?;
    let records = UserAchievementRepo::list_unseen(&state.pool, user_id).await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// POST /api/engagement/achievements/seen
///
/// Ids that do not belong to the user, are not completed, or were already
/// seen are ignored.
pub async fn mark_achievements_seen(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<MarkSeenRequest>,
) -> AppResult<Json<ApiResponse<MarkSeenResult>>> {
    let user_id = input.user_id.unwrap_or(auth.user_id);
    auth.authorize_user(user_id)?;

    let marked =
        UserAchievementRepo::mark_seen(&state.pool, user_id, &input.user_achievement_ids).await?;
    tracing::debug!(user_id, marked, "Achievements marked as seen");

    Ok(Json(
        ApiResponse::ok(MarkSeenResult { marked }).with_message("Achievements marked as seen"),
    ))
}

/// GET /api/engagement/user-points/{user_id}
pub async fn get_user_points(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<UserPoints>>> {
    auth.authorize_user(user_id)?;
    let total_points = UserAchievementRepo::total_points(&state.pool, user_id).await?;
    let points_breakdown = UserAchievementRepo::points_by_rarity(&state.pool, user_id)
        .await?
        .into_iter()
        .map(|row| (row.rarity_level, row.points))
        .collect();

    Ok(Json(ApiResponse::ok(UserPoints {
        user_id,
        total_points,
        points_breakdown,
    })))
}

// ---------------------------------------------------------------------------
// Unlock flows
// ---------------------------------------------------------------------------

/// POST /api/engagement/unlock-achievement
pub async fn unlock_achievement(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UnlockAchievementRequest>,
) -> AppResult<impl IntoResponse> {
    auth.authorize_user(input.user_id)?;

    let write = state
        .engine
        .unlock_achievement(
            input.user_id,
            input.achievement_id,
            input.progress_percentage,
            input.points_earned,
            Some(&auth.token),
        )
        .await?;

    let message = if write.newly_completed {
        "Achievement unlocked successfully"
    } else {
        "Achievement already unlocked"
    };
    Ok(Json(ApiResponse::ok(write.record).with_message(message)))
}

/// PUT /api/engagement/achievement-progress/{user_id}
pub async fn update_achievement_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateProgressRequest>,
) -> AppResult<impl IntoResponse> {
    auth.authorize_user(user_id)?;

    let write = state
        .engine
        .update_progress(
            user_id,
            input.achievement_id,
            input.progress_percentage,
            Some(&auth.token),
        )
        .await?;

    Ok(Json(
        ApiResponse::ok(write.record).with_message("Achievement progress updated"),
    ))
}

/// POST /api/engagement/check-achievements
pub async fn check_achievements(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CheckAchievementsRequest>,
) -> AppResult<Json<ApiResponse<CheckOutcome>>> {
    auth.authorize_user(input.user_id)?;

    let outcome = state
        .engine
        .check_achievements(input.user_id, Some(&auth.token))
        .await?;

    let message = format!("{} new achievement(s) unlocked", outcome.total_unlocked);
    Ok(Json(ApiResponse::ok(outcome).with_message(message)))
}

/// POST /api/engagement/unlock-level-achievement
pub async fn unlock_level_achievement(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UnlockLevelRequest>,
) -> AppResult<Json<ApiResponse<LevelUnlockResult>>> {
    auth.authorize_user(input.user_id)?;
    let level = LevelTier::from_str_value(&input.level)?;

    let outcome = state
        .engine
        .unlock_level_achievement(input.user_id, level, Some(&auth.token))
        .await?;

    let response = match outcome {
        LevelUnlock::Unlocked {
            achievement,
            record,
        } => ApiResponse::ok(LevelUnlockResult {
            level: level.as_str(),
            already_unlocked: false,
            achievement,
            user_achievement: Some(record),
        })
        .with_message("Level achievement unlocked successfully"),
        LevelUnlock::AlreadyUnlocked { achievement } => ApiResponse::ok(LevelUnlockResult {
            level: level.as_str(),
            already_unlocked: true,
            achievement,
            user_achievement: None,
        })
        .with_message("Level achievement already unlocked"),
    };

    Ok(Json(response))
}
