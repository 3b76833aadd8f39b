//! Achievement unlock notifications.
//!
//! - [`AchievementUnlocked`] -- the message emitted when a record first
//!   transitions to completed.
//! - [`NotificationQueue`] -- bounded, non-blocking hand-off from request
//!   handlers to the background dispatcher.
//! - [`NotificationDispatcher`] -- drains the queue and pushes each message
//!   through a [`NotificationDelivery`] channel.
//! - [`delivery`] -- external delivery channels (comms service).

pub mod delivery;
pub mod dispatcher;
pub mod notification;
pub mod queue;

pub use delivery::comms::CommsDelivery;
pub use delivery::{DeliveryError, NotificationDelivery};
pub use dispatcher::NotificationDispatcher;
pub use notification::AchievementUnlocked;
pub use queue::NotificationQueue;
