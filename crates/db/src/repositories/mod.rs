//! Zero-sized repository structs. Each method takes a `&PgPool` and returns
//! `sqlx::Error` so callers decide how to surface failures.

pub mod achievement_repo;
pub mod engagement_metric_repo;
pub mod leaderboard_repo;
pub mod reward_repo;
pub mod user_achievement_repo;

pub use achievement_repo::AchievementRepo;
pub use engagement_metric_repo::EngagementMetricRepo;
pub use leaderboard_repo::LeaderboardRepo;
pub use reward_repo::RewardRepo;
pub use user_achievement_repo::UserAchievementRepo;
