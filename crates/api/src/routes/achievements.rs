use axum::routing::{get, post};
use axum::Router;

use crate::handlers::achievements;
use crate::state::AppState;

/// Achievement ledger and unlock routes.
///
/// `/achievements/seen` is a static segment and takes precedence over
/// `/achievements/{user_id}`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/achievements/seen", post(achievements::mark_achievements_seen))
        .route("/achievements/{user_id}", get(achievements::get_user_achievements))
        .route(
            "/achievements/{user_id}/recent",
            get(achievements::get_recent_achievements),
        )
        .route(
            "/achievements/{user_id}/unseen",
            get(achievements::get_unseen_achievements),
        )
        .route(
            "/available-achievements",
            get(achievements::get_available_achievements),
        )
        .route(
            "/achievement-progress/{user_id}",
            get(achievements::get_achievement_progress)
                .put(achievements::update_achievement_progress),
        )
        .route("/unlock-achievement", post(achievements::unlock_achievement))
        .route("/check-achievements", post(achievements::check_achievements))
        .route(
            "/unlock-level-achievement",
            post(achievements::unlock_level_achievement),
        )
        .route("/user-points/{user_id}", get(achievements::get_user_points))
}
