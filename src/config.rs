//! Environment based configuration.
//!
//! | Variable | Meaning |
//! |---|---|
//! | `PUSH_GOOGLE_CREDENTIALS` | service account JSON path (falls back to `GOOGLE_APPLICATION_CREDENTIALS`) |
//! | `PUSH_APNS_CERTIFICATE` | `.p12` / `.pem` client certificate path |
//! | `PUSH_APNS_PASSWORD` | certificate passphrase |
//! | `PUSH_APNS_ENVIRONMENT` | `sandbox` or `production`, required with a certificate |
//! | `PUSH_APNS_TOPIC` | default `apns-topic`, usually the bundle id |

use std::path::PathBuf;

use nova_apns_shared::{ApnsConfig, ApnsEnvironment, CertificateSource};
use nova_fcm_shared::credentials::GOOGLE_APPLICATION_CREDENTIALS;
use serde::Deserialize;
use tracing::debug;

use crate::error::{PushError, Result};

pub const ENV_PREFIX: &str = "PUSH_";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushConfig {
    pub google_credentials: Option<PathBuf>,
    pub apns_certificate: Option<PathBuf>,
    pub apns_password: Option<String>,
    pub apns_environment: Option<ApnsEnvironment>,
    pub apns_topic: Option<String>,
}

impl PushConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        let mut config: PushConfig = envy::prefixed(ENV_PREFIX)
            .from_iter(vars.iter().cloned())
            .map_err(|e| PushError::Config(e.to_string()))?;

        if config.google_credentials.is_none() {
            config.google_credentials = vars
                .iter()
                .find(|(k, v)| k == GOOGLE_APPLICATION_CREDENTIALS && !v.is_empty())
                .map(|(_, v)| PathBuf::from(v));
        }

        Ok(config)
    }

    /// APNs client configuration, if a certificate is configured.
    pub fn apns_config(&self) -> Result<Option<ApnsConfig>> {
        let Some(certificate) = &self.apns_certificate else {
            return Ok(None);
        };
        let environment = self.apns_environment.ok_or_else(|| {
            PushError::Config(format!(
                "{ENV_PREFIX}APNS_ENVIRONMENT must be set to sandbox or production"
            ))
        })?;

        let mut cfg = ApnsConfig::new(CertificateSource::File(certificate.clone()), environment);
        if let Some(password) = &self.apns_password {
            cfg = cfg.with_passphrase(password.clone());
        }
        if let Some(topic) = self.apns_topic.as_ref().filter(|t| !t.is_empty()) {
            cfg = cfg.with_default_topic(topic.clone());
        }
        Ok(Some(cfg))
    }
}
