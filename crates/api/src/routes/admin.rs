use axum::routing::{post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Catalog administration routes mounted at `/admin`. Every handler requires
/// the `admin` role.
///
/// ```text
/// POST /achievements       -> create_achievement
/// PUT  /achievements/{id}  -> update_achievement
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/achievements", post(admin::create_achievement))
        .route("/achievements/{id}", put(admin::update_achievement))
}
