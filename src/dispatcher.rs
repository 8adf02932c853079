use std::sync::Arc;

use nova_apns_shared::ApnsClient;
use nova_fcm_shared::FCMClient;
use tracing::{debug, info};

use crate::config::PushConfig;
use crate::error::{PushError, Result};
use crate::message::{Message, Platform};
use crate::sender::{AppleSender, GoogleSender, PushProvider, SendReceipt};

/// Routes a [`Message`] to the Apple and/or Google sender.
///
/// Holds no state beyond the configured senders; build it once and share
/// it (it is `Send + Sync`).
#[derive(Clone, Default)]
pub struct Dispatcher {
    apple: Option<Arc<dyn PushProvider>>,
    google: Option<Arc<dyn PushProvider>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_apple(mut self, provider: impl PushProvider + 'static) -> Self {
        self.apple = Some(Arc::new(provider));
        self
    }

    pub fn with_google(mut self, provider: impl PushProvider + 'static) -> Self {
        self.google = Some(Arc::new(provider));
        self
    }

    /// Build senders for whatever `config` enables.
    pub fn from_config(config: &PushConfig) -> Result<Self> {
        let mut dispatcher = Self::new();

        if let Some(path) = &config.google_credentials {
            let client = FCMClient::from_service_account_file(Some(path.as_path()))?;
            info!(project_id = %client.project_id(), "google push enabled");
            dispatcher = dispatcher.with_google(GoogleSender::new(client));
        }

        if let Some(apns) = config.apns_config()? {
            let client = ApnsClient::new(&apns)?;
            info!(environment = %apns.environment, "apple push enabled");
            dispatcher = dispatcher.with_apple(AppleSender::new(client));
        }

        Ok(dispatcher)
    }

    pub fn is_configured(&self, platform: Platform) -> bool {
        self.provider(platform).is_some()
    }

    /// Send to Google. Fails with `NoDestination` before any network call
    /// when the message has no Google destination.
    pub async fn send_google(&self, message: &Message) -> Result<SendReceipt> {
        self.send_to(Platform::Google, message).await
    }

    /// Send to Apple. Fails with `NoDestination` before any network call
    /// when the message has no Apple destination.
    pub async fn send_apple(&self, message: &Message) -> Result<SendReceipt> {
        self.send_to(Platform::Apple, message).await
    }

    /// Send to every platform the message is addressed to, one after the
    /// other. Fails with `NoDestination` when neither destination is set.
    pub async fn send(&self, message: &Message) -> Result<Vec<(Platform, Result<SendReceipt>)>> {
        let platforms: Vec<Platform> = [Platform::Apple, Platform::Google]
            .into_iter()
            .filter(|p| message.destination(*p).is_some())
            .collect();

        if platforms.is_empty() {
            return Err(PushError::NoDestinations);
        }

        let mut results = Vec::with_capacity(platforms.len());
        for platform in platforms {
            results.push((platform, self.send_to(platform, message).await));
        }
        Ok(results)
    }

    async fn send_to(&self, platform: Platform, message: &Message) -> Result<SendReceipt> {
        if message.destination(platform).is_none() {
            return Err(PushError::NoDestination(platform));
        }
        let provider = self
            .provider(platform)
            .ok_or(PushError::ProviderNotConfigured(platform))?;

        debug!(%platform, "dispatching message");
        provider.send(message).await
    }

    fn provider(&self, platform: Platform) -> Option<&Arc<dyn PushProvider>> {
        match platform {
            Platform::Apple => self.apple.as_ref(),
            Platform::Google => self.google.as_ref(),
        }
    }
}
