//! Pushwoosh message building and batched delivery.
//!
//! - `PushwooshMessage`: fluent builder for one notification
//! - `Pushwoosh`: API client holding credentials and the transport
//! - `PendingMessage`: batch that sends all queued messages in one request

mod message;
mod pending_message;
mod pushwoosh;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use message::{Content, DeliveryMoment, Notification, Platform, PushwooshMessage};
pub use pending_message::{PendingMessage, SentMessages};
pub use pushwoosh::{DEFAULT_ENDPOINT, Pushwoosh};
