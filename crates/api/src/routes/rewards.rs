use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rewards;
use crate::state::AppState;

/// ```text
/// GET  /rewards/{user_id}      -> get_available_rewards
/// GET  /user-rewards/{user_id} -> get_user_rewards
/// POST /redeem-reward          -> redeem_reward
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rewards/{user_id}", get(rewards::get_available_rewards))
        .route("/user-rewards/{user_id}", get(rewards::get_user_rewards))
        .route("/redeem-reward", post(rewards::redeem_reward))
}
