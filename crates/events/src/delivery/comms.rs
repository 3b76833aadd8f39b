//! Comms service delivery with exponential-backoff retry.
//!
//! [`CommsDelivery`] posts the notification payload to
//! `{base_url}/api/comms/achievement-notification`. Failed attempts are
//! retried twice with backoff (1 s, 2 s).

use std::time::Duration;

use async_trait::async_trait;

use super::{DeliveryError, NotificationDelivery};
use crate::notification::AchievementUnlocked;

/// Path of the notification endpoint on the comms service.
pub const NOTIFICATION_PATH: &str = "/api/comms/achievement-notification";

/// Retry delays in seconds before each retry attempt.
const RETRY_DELAYS_SECS: [u64; 2] = [1, 2];

/// Delivers unlock notifications to the comms service.
pub struct CommsDelivery {
    client: reqwest::Client,
    endpoint: String,
}

impl CommsDelivery {
    /// Create a delivery channel with a per-attempt request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{NOTIFICATION_PATH}", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, notification: &AchievementUnlocked) -> Result<(), DeliveryError> {
        let mut request = self.client.post(&self.endpoint).json(&notification.payload());
        if let Some(token) = &notification.auth_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(DeliveryError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationDelivery for CommsDelivery {
    async fn deliver(&self, notification: &AchievementUnlocked) -> Result<(), DeliveryError> {
        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(notification).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        user_id = notification.user_id,
                        achievement_id = notification.achievement_id,
                        error = %e,
                        "Notification delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        self.try_send(notification).await.inspect_err(|e| {
            tracing::error!(
                user_id = notification.user_id,
                achievement_id = notification.achievement_id,
                error = %e,
                "Notification delivery failed after all retries"
            );
        })
    }
}
