//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for `GET /leaderboard`.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub timeframe: Option<String>,
    pub limit: Option<i64>,
}
