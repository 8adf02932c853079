use std::path::Path;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::debug;

use crate::credentials::{self, SigningConfig};
use crate::errors::FCMError;
use crate::models::*;
use crate::token::{ServiceAccountTokenSource, TokenCache, TokenSource};

/// Production FCM host.
pub const FCM_ENDPOINT: &str = "https://fcm.googleapis.com";

/// Firebase Cloud Messaging Client
///
/// Sends one message per call to the FCM v1 API, minting and caching the
/// OAuth2 access token as needed. Each send is a single HTTP attempt; retry
/// policy belongs to the caller.
pub struct FCMClient {
    project_id: String,
    tokens: TokenCache,
    http_client: reqwest::Client,
    endpoint: String,
}

impl FCMClient {
    /// Create new FCM client
    ///
    /// # Arguments
    /// * `config` - Signing configuration parsed from the service account
    /// * `project_id` - Firebase project ID
    pub fn new(config: SigningConfig, project_id: String) -> Self {
        Self::with_token_source(project_id, Arc::new(ServiceAccountTokenSource::new(config)))
    }

    /// Build a client from a raw service account JSON blob.
    pub fn from_service_account_json(bytes: &[u8]) -> Result<Self, FCMError> {
        let (config, project_id) = credentials::from_json_bytes(bytes)?;
        Ok(Self::new(config, project_id))
    }

    /// Build a client from a service account file, falling back to
    /// `$GOOGLE_APPLICATION_CREDENTIALS` when `path` is `None`.
    pub fn from_service_account_file(path: Option<&Path>) -> Result<Self, FCMError> {
        let (config, project_id) = credentials::from_file(path)?;
        Ok(Self::new(config, project_id))
    }

    pub fn with_token_source(project_id: String, source: Arc<dyn TokenSource>) -> Self {
        Self {
            project_id,
            tokens: TokenCache::new(source),
            http_client: reqwest::Client::new(),
            endpoint: FCM_ENDPOINT.to_string(),
        }
    }

    /// Use a caller-built HTTP client, e.g. one with request timeouts.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Point the client at another FCM host.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    pub fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint, self.project_id
        )
    }

    /// Send notification via FCM
    pub async fn send(&self, message: &FcmMessage) -> Result<FCMSendResult, FCMError> {
        self.post(message, false).await
    }

    /// Ask FCM to validate the message without delivering it.
    pub async fn validate(&self, message: &FcmMessage) -> Result<FCMSendResult, FCMError> {
        self.post(message, true).await
    }

    async fn post(
        &self,
        message: &FcmMessage,
        validate_only: bool,
    ) -> Result<FCMSendResult, FCMError> {
        let token = self.tokens.valid_token().await?;
        let request = FcmRequest {
            validate_only,
            message,
        };

        debug!(
            project_id = %self.project_id,
            token_prefix = %prefix(message.token.as_deref()),
            topic = message.topic.as_deref().unwrap_or(""),
            validate_only,
            "sending fcm message"
        );

        let response = self
            .http_client
            .post(self.send_url())
            .header(AUTHORIZATION, token.authorization())
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(FCMError::SendRequestError)?;

        let status = response.status();
        let body = response.bytes().await.map_err(FCMError::SendRequestError)?;

        if status != StatusCode::OK {
            let rejected: FcmErrorResponse = serde_json::from_slice(&body).map_err(|e| {
                FCMError::ResponseParseError(format!(
                    "status {}: {e}: {}",
                    status.as_u16(),
                    String::from_utf8_lossy(&body)
                ))
            })?;
            debug!(status = status.as_u16(), error_status = %rejected.error.status, "fcm rejected message");
            return Err(FCMError::ApiError {
                status: status.as_u16(),
                error: rejected.error,
            });
        }

        let accepted: FcmApiResponse = serde_json::from_slice(&body)
            .map_err(|e| FCMError::ResponseParseError(e.to_string()))?;

        debug!(message_id = %accepted.name, "sent fcm notification successfully");
        Ok(FCMSendResult {
            message_id: accepted.name,
            status: StatusCode::OK.as_u16(),
        })
    }
}

fn prefix(token: Option<&str>) -> String {
    token.unwrap_or("").chars().take(8).collect()
}
