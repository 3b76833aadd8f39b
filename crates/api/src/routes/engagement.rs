use axum::routing::{get, post};
use axum::Router;

use crate::handlers::engagement;
use crate::state::AppState;

/// ```text
/// POST /engagement-metrics    -> track_engagement_metrics
/// GET  /user-stats/{user_id}  -> get_user_stats
/// GET  /leaderboard           -> get_leaderboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/engagement-metrics",
            post(engagement::track_engagement_metrics),
        )
        .route("/user-stats/{user_id}", get(engagement::get_user_stats))
        .route("/leaderboard", get(engagement::get_leaderboard))
}
