pub mod achievements;
pub mod admin;
pub mod engagement;
pub mod health;
pub mod rewards;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/engagement` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /achievements/{user_id}                 user's achievement records (GET)
/// /achievements/{user_id}/recent          completions in the last hour (GET)
/// /achievements/{user_id}/unseen          unseen completions (GET)
/// /achievements/seen                      mark as seen (POST)
/// /available-achievements                 active catalog (GET)
/// /achievement-progress/{user_id}         overview (GET), update (PUT)
/// /unlock-achievement                     direct unlock (POST)
/// /check-achievements                     evaluate criteria (POST)
/// /unlock-level-achievement               level tier unlock (POST)
/// /user-points/{user_id}                  point totals (GET)
///
/// /rewards/{user_id}                      reward catalog (GET)
/// /user-rewards/{user_id}                 affordable rewards (GET)
/// /redeem-reward                          redemption preview (POST)
///
/// /engagement-metrics                     daily metrics upsert (POST)
/// /user-stats/{user_id}                   engagement summary (GET)
/// /leaderboard                            rankings (GET)
///
/// /admin/achievements                     create (POST, admin only)
/// /admin/achievements/{id}                update (PUT, admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(achievements::router())
        .merge(rewards::router())
        .merge(engagement::router())
        .nest("/admin", admin::router())
}
