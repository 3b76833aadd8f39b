//! External delivery channels for unlock notifications.

use async_trait::async_trait;

use crate::notification::AchievementUnlocked;

pub mod comms;

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Comms service returned HTTP {0}")]
    HttpStatus(u16),
}

/// A channel that can push an unlock notification to the user.
///
/// Implementations log their own final failure.
#[async_trait]
pub trait NotificationDelivery: Send + Sync {
    async fn deliver(&self, notification: &AchievementUnlocked) -> Result<(), DeliveryError>;
}
