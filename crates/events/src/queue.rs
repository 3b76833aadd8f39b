//! Bounded notification queue.
//!
//! Handlers enqueue without waiting. When the dispatcher falls behind and
//! the buffer is full, the notification is dropped with a warning; the
//! unlock itself is already committed and `notification_sent` stays false.

use tokio::sync::mpsc;

use crate::notification::AchievementUnlocked;

/// Default buffer capacity.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Cloneable sending half of the notification channel.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<AchievementUnlocked>,
}

impl NotificationQueue {
    /// Create a queue and the receiver the dispatcher drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AchievementUnlocked>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueue a notification without blocking.
    ///
    /// Returns `false` if the notification was dropped.
    pub fn enqueue(&self, notification: AchievementUnlocked) -> bool {
        match self.sender.try_send(notification) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(n)) => {
                tracing::warn!(
                    user_id = n.user_id,
                    achievement_id = n.achievement_id,
                    "Notification queue full, dropping unlock notification"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(n)) => {
                tracing::warn!(
                    user_id = n.user_id,
                    achievement_id = n.achievement_id,
                    "Notification dispatcher stopped, dropping unlock notification"
                );
                false
            }
        }
    }
}
