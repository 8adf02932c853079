//! Nova Push
//!
//! One notification model, two providers. A [`Message`] is translated into
//! an APNs notification or an FCM v1 message and sent through the matching
//! sender; the caller gets back a normalized `(message_id, status)` receipt
//! or a [`PushError`].
//!
//! # Example
//!
//! ```no_run
//! use nova_push::{Destination, Dispatcher, Message, PushConfig, Priority};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::from_config(&PushConfig::from_env()?)?;
//!
//!     let message = Message::builder()
//!         .google(Destination::device("fcm-registration-token"))
//!         .title("Hello")
//!         .body("Hello from the other side")
//!         .priority(Priority::HIGH)
//!         .build();
//!
//!     let receipt = dispatcher.send_google(&message).await?;
//!     println!("sent {}", receipt.message_id);
//!     Ok(())
//! }
//! ```
//!
//! Every send is a single attempt. Deadlines are the caller's: wrap the
//! future in `tokio::time::timeout` or hand the clients a `reqwest::Client`
//! with timeouts.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod sender;
pub mod translate;

pub use config::PushConfig;
pub use dispatcher::Dispatcher;
pub use error::{ErrorKind, PushError, Result};
pub use message::{Destination, Message, MessageBuilder, Platform, Priority};
pub use sender::{AppleSender, GoogleSender, PushProvider, SendReceipt};

pub use nova_apns_shared as apns;
pub use nova_fcm_shared as fcm;
