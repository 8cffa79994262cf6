//! Pushwoosh client library
//!
//! Builds Pushwoosh `createMessage` requests from typed messages, sends them
//! in scoped batches and reports the message codes the API assigns.
//!
//! ```ignore
//! use pushwoosh_rs::{ConfigLoader, Pushwoosh, PushwooshMessage, init_logger};
//!
//! let settings = ConfigLoader::new()?.load()?;
//! init_logger(settings.logger.clone().into_logger_config()?)?;
//!
//! let pushwoosh = Pushwoosh::from_settings(&settings.pushwoosh)?;
//! let sent = pushwoosh
//!     .pending()
//!     .queue(PushwooshMessage::new("Hello"))
//!     .flush()
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod notifications;

pub use config::{ConfigLoader, Settings};
pub use error::{PushwooshError, PushwooshResult};
pub use logger::init_logger;
pub use notifications::{
    Content, DeliveryMoment, Notification, PendingMessage, Platform, Pushwoosh, PushwooshMessage,
    SentMessages,
};
