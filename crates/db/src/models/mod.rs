//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` input DTOs where the table is written from the API

pub mod achievement;
pub mod engagement_metric;
pub mod leaderboard;
pub mod reward;
pub mod user_achievement;
