use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credentials::SigningConfig;
use crate::errors::FCMError;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// OAuth2 bearer token with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && self.expires_at > now
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        let token_type = if self.token_type.is_empty() {
            "Bearer"
        } else {
            &self.token_type
        };
        format!("{} {}", token_type, self.access_token)
    }
}

/// Something that can mint a fresh access token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<AccessToken, FCMError>;
}

/// JWT Claims for Google OAuth2
#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

/// Google OAuth2 Token Response
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    token_type: String,
}

/// Exchanges a signed service account assertion for an access token.
pub struct ServiceAccountTokenSource {
    config: SigningConfig,
    http_client: reqwest::Client,
}

impl ServiceAccountTokenSource {
    pub fn new(config: SigningConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    pub fn with_http_client(config: SigningConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, FCMError> {
        let claims = JwtClaims {
            iss: &self.config.client_email,
            scope: &self.config.scope,
            aud: &self.config.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let header = Header {
            typ: Some("JWT".into()),
            alg: Algorithm::RS256,
            kid: self.config.private_key_id.clone(),
            ..Header::default()
        };

        encode(&header, &claims, self.config.encoding_key())
            .map_err(|e| FCMError::TokenExchangeFailed(format!("failed to encode JWT: {e}")))
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn fetch_token(&self) -> Result<AccessToken, FCMError> {
        let assertion = self.sign_assertion(Utc::now())?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        debug!(token_uri = %self.config.token_uri, "exchanging assertion for access token");
        let response = self
            .http_client
            .post(&self.config.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| FCMError::TokenExchangeFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
            return Err(FCMError::TokenExchangeFailed(format!(
                "token request failed with status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: GoogleTokenResponse = response.json().await.map_err(|e| {
            FCMError::TokenExchangeFailed(format!("failed to parse token response: {e}"))
        })?;

        Ok(AccessToken {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

/// Caches the current access token and refreshes it when absent or expired.
///
/// The token is swapped as a whole under a short write lock; the lock is
/// never held while a refresh is in flight, so two racing refreshes may both
/// complete and the last one wins.
pub struct TokenCache {
    source: Arc<dyn TokenSource>,
    token: RwLock<Option<Arc<AccessToken>>>,
}

impl TokenCache {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            token: RwLock::new(None),
        }
    }

    /// Start from an already issued token.
    pub fn with_token(source: Arc<dyn TokenSource>, token: AccessToken) -> Self {
        Self {
            source,
            token: RwLock::new(Some(Arc::new(token))),
        }
    }

    pub fn current_token(&self) -> Option<Arc<AccessToken>> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn ensure_valid(&self) -> Result<(), FCMError> {
        self.valid_token().await.map(|_| ())
    }

    /// Return the cached token, refreshing it first if needed.
    pub async fn valid_token(&self) -> Result<Arc<AccessToken>, FCMError> {
        if let Some(token) = self.current_token().filter(|t| t.is_valid()) {
            return Ok(token);
        }

        debug!("refreshing access token");
        let token = Arc::new(self.source.fetch_token().await?);
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());

        debug!(expires_at = %token.expires_at, "access token refreshed");
        Ok(token)
    }
}
