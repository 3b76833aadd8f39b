//! Reward catalog and redemption preview.
//!
//! Redemption checks availability and affordability against the user's live
//! point balance. Nothing is persisted and no points are deducted.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use engagement_core::error::CoreError;
use engagement_core::rewards::{is_affordable, quote_redemption};
use engagement_core::types::DbId;
use engagement_db::models::reward::Reward;
use engagement_db::repositories::{RewardRepo, UserAchievementRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{ApiPath, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RedeemRewardRequest {
    #[validate(range(min = 1, message = "The user id must be a positive integer."))]
    pub user_id: DbId,
    #[validate(range(min = 1, message = "The reward id must be a positive integer."))]
    pub reward_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct RewardWithAffordability {
    #[serde(flatten)]
    pub reward: Reward,
    pub affordable: bool,
}

#[derive(Debug, Serialize)]
pub struct RewardCatalog<T: Serialize> {
    pub user_points: i64,
    pub rewards: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct Redemption {
    pub reward: Reward,
    pub points_deducted: i64,
    pub remaining_points: i64,
}

/// GET /api/engagement/rewards/{user_id}
pub async fn get_available_rewards(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.authorize_user(user_id)?;
    let user_points = UserAchievementRepo::total_points(&state.pool, user_id).await?;
    let rewards = RewardRepo::list_available(&state.pool)
        .await?
        .into_iter()
        .map(|reward| RewardWithAffordability {
            affordable: is_affordable(user_points, reward.requirement_points),
            reward,
        })
        .collect();

    Ok(Json(ApiResponse::ok(RewardCatalog {
        user_points,
        rewards,
    })))
}

/// GET /api/engagement/user-rewards/{user_id}
///
/// Only the rewards the user can currently afford.
pub async fn get_user_rewards(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.authorize_user(user_id)?;
    let user_points = UserAchievementRepo::total_points(&state.pool, user_id).await?;
    let rewards = RewardRepo::list_affordable(&state.pool, user_points).await?;

    Ok(Json(ApiResponse::ok(RewardCatalog {
        user_points,
        rewards,
    })))
}

/// POST /api/engagement/redeem-reward
pub async fn redeem_reward(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RedeemRewardRequest>,
) -> AppResult<impl IntoResponse> {
    auth.authorize_user(input.user_id)?;

    let reward = RewardRepo::find_by_id(&state.pool, input.reward_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Reward",
            id: input.reward_id,
        })?;
    let user_points = UserAchievementRepo::total_points(&state.pool, input.user_id).await?;
    let quote = quote_redemption(user_points, reward.requirement_points, reward.is_available)?;

    tracing::info!(
        user_id = input.user_id,
        reward_id = reward.reward_id,
        points_deducted = quote.points_deducted,
        "Reward redemption previewed",
    );

    Ok(Json(
        ApiResponse::ok(Redemption {
            reward,
            points_deducted: quote.points_deducted,
            remaining_points: quote.remaining_points,
        })
        .with_message("Reward redeemed successfully"),
    ))
}
