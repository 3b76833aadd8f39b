//! Client for the workout tracking service.
//!
//! The engagement service never stores workout data itself. Before each
//! achievement check it asks the tracking service for the user's aggregate
//! [`UserStats`](engagement_core::criteria::UserStats) through a
//! [`StatsSource`].

pub mod client;
pub mod stats;

pub use client::{TrackingClient, TrackingError};
pub use stats::decode_stats;

use async_trait::async_trait;
use engagement_core::criteria::UserStats;
use engagement_core::types::DbId;

/// Anything that can produce aggregate workout stats for a user.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_stats(&self, user_id: DbId) -> Result<UserStats, TrackingError>;
}
