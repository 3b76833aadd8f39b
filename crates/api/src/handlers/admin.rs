//! Catalog administration. Criteria are parsed strictly here so the
//! evaluator only ever sees well-formed catalog rows.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use engagement_core::achievement::{
    validate_achievement_name, validate_badge_color, validate_badge_icon, validate_points_value,
    AchievementKind, Rarity,
};
use engagement_core::criteria::AchievementCriteria;
use engagement_core::error::CoreError;
use engagement_core::types::DbId;
use engagement_db::models::achievement::{CreateAchievement, UpdateAchievement};
use engagement_db::repositories::AchievementRepo;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::extract::{ApiPath, ValidatedJson};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAchievementRequest {
    #[validate(custom(function = "name_field"))]
    pub achievement_name: String,
    pub description: Option<String>,
    pub achievement_type: String,
    pub criteria_json: serde_json::Value,
    #[validate(custom(function = "points_field"))]
    pub points_value: Option<i32>,
    #[validate(custom(function = "badge_icon_field"))]
    pub badge_icon: Option<String>,
    #[validate(custom(function = "badge_color_field"))]
    pub badge_color: Option<String>,
    pub rarity_level: Option<String>,
    pub is_active: Option<bool>,
}

/// Partial update. The achievement type is fixed once created.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAchievementRequest {
    #[validate(custom(function = "name_field"))]
    pub achievement_name: Option<String>,
    pub description: Option<String>,
    pub criteria_json: Option<serde_json::Value>,
    #[validate(custom(function = "points_field"))]
    pub points_value: Option<i32>,
    #[validate(custom(function = "badge_icon_field"))]
    pub badge_icon: Option<String>,
    #[validate(custom(function = "badge_color_field"))]
    pub badge_color: Option<String>,
    pub rarity_level: Option<String>,
    pub is_active: Option<bool>,
}

fn field_error(code: &'static str, err: CoreError) -> ValidationError {
    let message = match err {
        CoreError::Validation(msg) => msg,
        other => other.to_string(),
    };
    ValidationError::new(code).with_message(message.into())
}

fn name_field(name: &str) -> Result<(), ValidationError> {
    validate_achievement_name(name).map_err(|e| field_error("achievement_name", e))
}

fn points_field(points: i32) -> Result<(), ValidationError> {
    validate_points_value(points).map_err(|e| field_error("points_value", e))
}

fn badge_icon_field(icon: &str) -> Result<(), ValidationError> {
    validate_badge_icon(icon).map_err(|e| field_error("badge_icon", e))
}

fn badge_color_field(color: &str) -> Result<(), ValidationError> {
    validate_badge_color(color).map_err(|e| field_error("badge_color", e))
}

fn normalize_rarity(rarity: Option<String>) -> AppResult<Option<String>> {
    rarity
        .map(|r| Rarity::from_str_value(&r).map(|r| r.as_str().to_string()))
        .transpose()
        .map_err(AppError::from)
}

/// POST /api/engagement/admin/achievements
///
/// Criteria are stored in canonical form; legacy key aliases are rewritten.
pub async fn create_achievement(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateAchievementRequest>,
) -> AppResult<impl IntoResponse> {
    let kind = AchievementKind::from_str_value(&input.achievement_type)?;
    let criteria = AchievementCriteria::parse(kind, &input.criteria_json)?;

    let create = CreateAchievement {
        achievement_name: input.achievement_name.trim().to_string(),
        description: input.description,
        achievement_type: kind.as_str().to_string(),
        criteria_json: criteria.to_json(),
        points_value: input.points_value,
        badge_icon: input.badge_icon,
        badge_color: input.badge_color,
        rarity_level: normalize_rarity(input.rarity_level)?,
        is_active: input.is_active,
    };

    let achievement = AchievementRepo::create(&state.pool, &create).await?;

    tracing::info!(
        admin_id = admin.user_id,
        achievement_id = achievement.achievement_id,
        kind = kind.as_str(),
        "Achievement created",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(achievement).with_message("Achievement created successfully")),
    ))
}

/// PUT /api/engagement/admin/achievements/{id}
///
/// Existing `points_earned` on the ledger is never recomputed.
pub async fn update_achievement(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateAchievementRequest>,
) -> AppResult<impl IntoResponse> {
    let existing = AchievementRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Achievement",
            id,
        })?;

    let criteria_json = match &input.criteria_json {
        Some(raw) => {
            let kind = AchievementKind::from_str_value(&existing.achievement_type)?;
            Some(AchievementCriteria::parse(kind, raw)?.to_json())
        }
        None => None,
    };

    let update = UpdateAchievement {
        achievement_name: input.achievement_name.map(|n| n.trim().to_string()),
        description: input.description,
        criteria_json,
        points_value: input.points_value,
        badge_icon: input.badge_icon,
        badge_color: input.badge_color,
        rarity_level: normalize_rarity(input.rarity_level)?,
        is_active: input.is_active,
    };

    let achievement = AchievementRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Achievement",
            id,
        })?;

    tracing::info!(admin_id = admin.user_id, achievement_id = id, "Achievement updated");

    Ok(Json(
        ApiResponse::ok(achievement).with_message("Achievement updated successfully"),
    ))
}
