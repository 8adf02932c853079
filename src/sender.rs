//! Provider adapters behind one `send(&Message)` capability.

use async_trait::async_trait;
use nova_apns_shared::ApnsClient;
use nova_fcm_shared::FCMClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::message::{Message, Platform};

/// Normalized outcome of a successful send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub message_id: String,
    pub status: u16,
}

/// Trait for push notification providers
#[async_trait]
pub trait PushProvider: Send + Sync {
    fn platform(&self) -> Platform;

    /// Translate and send `message`. Exactly one network attempt.
    async fn send(&self, message: &Message) -> Result<SendReceipt>;
}

/// Sends through Firebase Cloud Messaging.
pub struct GoogleSender {
    client: FCMClient,
}

impl GoogleSender {
    pub fn new(client: FCMClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &FCMClient {
        &self.client
    }
}

#[async_trait]
impl PushProvider for GoogleSender {
    fn platform(&self) -> Platform {
        Platform::Google
    }

    async fn send(&self, message: &Message) -> Result<SendReceipt> {
        let payload = message.to_fcm();
        let result = self.client.send(&payload).await?;
        debug!(message_id = %result.message_id, "google send complete");
        Ok(SendReceipt {
            message_id: result.message_id,
            status: result.status,
        })
    }
}

/// Sends through the Apple Push Notification service.
pub struct AppleSender {
    client: ApnsClient,
}

impl AppleSender {
    pub fn new(client: ApnsClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApnsClient {
        &self.client
    }
}

#[async_trait]
impl PushProvider for AppleSender {
    fn platform(&self) -> Platform {
        Platform::Apple
    }

    async fn send(&self, message: &Message) -> Result<SendReceipt> {
        let payload = message.to_apns();
        let result = self.client.send(&payload).await?;
        debug!(message_id = %result.message_id, "apple send complete");
        Ok(SendReceipt {
            message_id: result.message_id,
            status: result.status,
        })
    }
}
