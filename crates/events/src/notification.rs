//! The unlock notification message.

use engagement_core::types::DbId;
use serde::Serialize;

/// Notification type understood by the comms service.
pub const ACHIEVEMENT_UNLOCKED: &str = "achievement_unlocked";

/// Emitted once per (user, achievement) when the record first completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementUnlocked {
    pub user_id: DbId,
    pub achievement_id: DbId,
    /// Bearer token of the request that caused the unlock, forwarded to the
    /// comms service when present.
    pub auth_token: Option<String>,
}

/// JSON body posted to the comms service.
#[derive(Debug, Serialize)]
pub struct NotificationPayload {
    pub user_id: DbId,
    #[serde(rename = "type")]
    pub notification_type: &'static str,
    pub achievement_id: DbId,
}

impl AchievementUnlocked {
    pub fn new(user_id: DbId, achievement_id: DbId) -> Self {
        Self {
            user_id,
            achievement_id,
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    pub fn payload(&self) -> NotificationPayload {
        NotificationPayload {
            user_id: self.user_id,
            notification_type: ACHIEVEMENT_UNLOCKED,
            achievement_id: self.achievement_id,
        }
    }
}
