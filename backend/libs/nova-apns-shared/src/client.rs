use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info};

use crate::certificate::load_identity;
use crate::config::ApnsConfig;
use crate::models::{ApnsErrorBody, ApnsNotification, ApnsSendResult, ApnsSuccessBody};

/// Error type for APNs operations
#[derive(Error, Debug)]
pub enum ApnsError {
    #[error("APNs certificate error: {0}")]
    Certificate(String),

    #[error("APNs configuration error: {0}")]
    Config(String),

    #[error("APNs send request failed: {0}")]
    SendRequestError(#[source] reqwest::Error),

    /// Non-200 answer; `reason` is APNs' own reason string, e.g. `BadDeviceToken`
    #[error("APNs rejected notification: {status} {reason}")]
    Rejected {
        status: u16,
        reason: String,
        timestamp: Option<i64>,
    },

    #[error("Failed to parse APNs response: {0}")]
    ResponseParseError(String),
}

impl ApnsError {
    /// Provider status for rejections, 500 for local failures.
    pub fn status_code(&self) -> u16 {
        match self {
            ApnsError::Rejected { status, .. } => *status,
            _ => 500,
        }
    }
}

/// Apple Push Notification Service (APNs) client
///
/// Talks HTTP/2 to APNs with certificate based authentication. One request
/// per [`ApnsClient::send`]; no retries.
#[derive(Clone)]
pub struct ApnsClient {
    http_client: reqwest::Client,
    endpoint: String,
    default_topic: Option<String>,
}

impl ApnsClient {
    /// Creates a new APNs client
    ///
    /// # Returns
    /// `Ok(ApnsClient)` if initialization succeeds, `Err(ApnsError)` if certificate loading fails
    pub fn new(cfg: &ApnsConfig) -> Result<Self, ApnsError> {
        let password = cfg.certificate_passphrase.as_deref().unwrap_or("");
        let identity = load_identity(&cfg.certificate, password)?;

        let http_client = reqwest::Client::builder()
            .use_native_tls()
            .identity(identity)
            .http2_prior_knowledge()
            .build()
            .map_err(|e| ApnsError::Config(format!("failed to initialize APNs client: {e}")))?;

        info!(
            environment = %cfg.environment,
            default_topic = cfg.default_topic.as_deref().unwrap_or(""),
            "Initialized APNs client"
        );

        Ok(Self {
            http_client,
            endpoint: cfg.endpoint(),
            default_topic: cfg.default_topic.clone(),
        })
    }

    /// Client over a caller-built HTTP client and endpoint.
    pub fn with_http_client(http_client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            default_topic: None,
        }
    }

    pub fn with_default_topic(mut self, topic: impl Into<String>) -> Self {
        self.default_topic = Some(topic.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a notification and returns the APNs assigned id.
    pub async fn send(&self, notification: &ApnsNotification) -> Result<ApnsSendResult, ApnsError> {
        let device_token_prefix = notification.device_token.chars().take(8).collect::<String>();
        let url = format!("{}/3/device/{}", self.endpoint, notification.device_token);

        let mut request = self.http_client.post(&url).json(&notification.payload);

        if let Some(expiration) = notification.expiration_header() {
            request = request.header("apns-expiration", expiration.to_string());
        }

        let topic = Some(notification.topic.as_str())
            .filter(|t| !t.is_empty())
            .or(self.default_topic.as_deref());
        if let Some(topic) = topic {
            request = request.header("apns-topic", topic);
        }
        if notification.priority > 0 {
            request = request.header("apns-priority", notification.priority.to_string());
        }
        if !notification.collapse_id.is_empty() {
            request = request.header("apns-collapse-id", notification.collapse_id.as_str());
        }

        debug!(token_prefix = %device_token_prefix, topic = topic.unwrap_or(""), "sending apns notification");
        let response = request.send().await.map_err(ApnsError::SendRequestError)?;

        let status = response.status();
        let apns_id = response
            .headers()
            .get("apns-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(ApnsError::SendRequestError)?;

        if status != StatusCode::OK {
            let rejected: ApnsErrorBody = serde_json::from_slice(&body).map_err(|e| {
                ApnsError::ResponseParseError(format!(
                    "status {}: {e}: {}",
                    status.as_u16(),
                    String::from_utf8_lossy(&body)
                ))
            })?;
            debug!(
                token_prefix = %device_token_prefix,
                status = status.as_u16(),
                reason = %rejected.reason,
                "apns rejected notification"
            );
            return Err(ApnsError::Rejected {
                status: status.as_u16(),
                reason: rejected.reason,
                timestamp: rejected.timestamp,
            });
        }

        let message_id = match apns_id {
            Some(id) => id,
            None if body.is_empty() => String::new(),
            None => serde_json::from_slice::<ApnsSuccessBody>(&body)
                .map_err(|e| ApnsError::ResponseParseError(e.to_string()))?
                .id
                .unwrap_or_default(),
        };

        debug!(
            token_prefix = %device_token_prefix,
            apns_id = %message_id,
            "APNs notification sent successfully"
        );
        Ok(ApnsSendResult {
            message_id,
            status: StatusCode::OK.as_u16(),
        })
    }
}
