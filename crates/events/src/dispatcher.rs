//! Background notification dispatcher.
//!
//! [`NotificationDispatcher`] drains the [`NotificationQueue`] receiver and
//! delivers each message. A successful delivery sets `notification_sent` on
//! the ledger row. Failures are logged; the unlock is never rolled back.
//!
//! On cancellation the receiver is closed and whatever is already buffered
//! is still delivered before the task exits.
//!
//! [`NotificationQueue`]: crate::queue::NotificationQueue

use std::sync::Arc;

use engagement_db::repositories::UserAchievementRepo;
use engagement_db::DbPool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::delivery::NotificationDelivery;
use crate::notification::AchievementUnlocked;

pub struct NotificationDispatcher {
    pool: DbPool,
    delivery: Arc<dyn NotificationDelivery>,
}

impl NotificationDispatcher {
    pub fn new(pool: DbPool, delivery: Arc<dyn NotificationDelivery>) -> Self {
        Self { pool, delivery }
    }

    /// Run the dispatch loop until cancelled or every sender is dropped.
    pub async fn run(
        self,
        mut receiver: mpsc::Receiver<AchievementUnlocked>,
        cancel: CancellationToken,
    ) {
        tracing::info!("Notification dispatcher started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    receiver.close();
                    while let Some(notification) = receiver.recv().await {
                        self.dispatch(&notification).await;
                    }
                    tracing::info!("Notification dispatcher stopping");
                    break;
                }
                next = receiver.recv() => match next {
                    Some(notification) => self.dispatch(&notification).await,
                    None => {
                        tracing::info!("Notification queue closed, dispatcher stopping");
                        break;
                    }
                },
            }
        }
    }

    /// Deliver one notification and record the outcome.
    pub async fn dispatch(&self, notification: &AchievementUnlocked) {
        if self.delivery.deliver(notification).await.is_err() {
            return;
        }

        match UserAchievementRepo::mark_notification_sent(
            &self.pool,
            notification.user_id,
            notification.achievement_id,
        )
        .await
        {
            Ok(true) => tracing::debug!(
                user_id = notification.user_id,
                achievement_id = notification.achievement_id,
                "Unlock notification delivered"
            ),
            Ok(false) => tracing::warn!(
                user_id = notification.user_id,
                achievement_id = notification.achievement_id,
                "Notification delivered for a record that is not completed"
            ),
            Err(e) => tracing::error!(
                user_id = notification.user_id,
                achievement_id = notification.achievement_id,
                error = %e,
                "Failed to record notification delivery"
            ),
        }
    }
}
