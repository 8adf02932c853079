use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::client::ApnsError;

/// APNs environment. There is no default: callers must pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApnsEnvironment {
    #[serde(alias = "development", alias = "dev")]
    Sandbox,
    #[serde(alias = "prod")]
    Production,
}

impl ApnsEnvironment {
    /// Get APNs API host based on environment
    pub fn host(&self) -> &'static str {
        match self {
            ApnsEnvironment::Production => "api.push.apple.com",
            ApnsEnvironment::Sandbox => "api.sandbox.push.apple.com",
        }
    }

    pub fn endpoint(&self) -> String {
        format!("https://{}", self.host())
    }
}

impl FromStr for ApnsEnvironment {
    type Err = ApnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "development" | "dev" => Ok(ApnsEnvironment::Sandbox),
            "production" | "prod" => Ok(ApnsEnvironment::Production),
            other => Err(ApnsError::Config(format!("unknown APNs environment: {other}"))),
        }
    }
}

impl fmt::Display for ApnsEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApnsEnvironment::Sandbox => f.write_str("sandbox"),
            ApnsEnvironment::Production => f.write_str("production"),
        }
    }
}

/// Where the APNs client certificate comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum CertificateSource {
    /// `.p12` or `.pem` file, picked by extension
    File(PathBuf),
    /// In-memory PKCS#12 or PEM bundle
    Bytes(Vec<u8>),
}

impl fmt::Debug for CertificateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateSource::File(path) => f.debug_tuple("File").field(path).finish(),
            CertificateSource::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

/// APNs Configuration
#[derive(Debug, Clone)]
pub struct ApnsConfig {
    pub certificate: CertificateSource,
    pub certificate_passphrase: Option<String>,
    pub environment: ApnsEnvironment,
    /// Topic used when a notification carries none, usually the bundle id
    pub default_topic: Option<String>,
}

impl ApnsConfig {
    /// Create new APNs configuration
    pub fn new(certificate: CertificateSource, environment: ApnsEnvironment) -> Self {
        Self {
            certificate,
            certificate_passphrase: None,
            environment,
            default_topic: None,
        }
    }

    /// Set certificate passphrase
    pub fn with_passphrase(mut self, passphrase: String) -> Self {
        self.certificate_passphrase = Some(passphrase);
        self
    }

    pub fn with_default_topic(mut self, topic: String) -> Self {
        self.default_topic = Some(topic);
        self
    }

    pub fn is_production(&self) -> bool {
        self.environment == ApnsEnvironment::Production
    }

    /// Get APNs API endpoint based on environment
    pub fn endpoint(&self) -> String {
        self.environment.endpoint()
    }
}
