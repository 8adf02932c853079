use nova_apns_shared::ApnsError;
use nova_fcm_shared::FCMError;
use thiserror::Error;

use crate::message::Platform;

/// Normalized error categories across both providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingProjectId,
    InvalidCredentials,
    InvalidCertificate,
    InvalidConfig,
    TokenExchangeFailed,
    TransportFailure,
    ProviderRejected,
    ProviderNotConfigured,
    NoDestination,
    ResponseParseFailed,
}

#[derive(Error, Debug)]
pub enum PushError {
    #[error("no {0} destination: please specify a device or a topic")]
    NoDestination(Platform),

    #[error("message has neither an apple nor a google destination")]
    NoDestinations,

    #[error("{0} push provider is not configured")]
    ProviderNotConfigured(Platform),

    #[error("invalid push configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Google(#[from] FCMError),

    #[error(transparent)]
    Apple(#[from] ApnsError),
}

impl PushError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PushError::NoDestination(_) | PushError::NoDestinations => ErrorKind::NoDestination,
            PushError::ProviderNotConfigured(_) => ErrorKind::ProviderNotConfigured,
            PushError::Config(_) => ErrorKind::InvalidConfig,
            PushError::Google(e) => match e {
                FCMError::MissingProjectId => ErrorKind::MissingProjectId,
                FCMError::InvalidCredentials(_) => ErrorKind::InvalidCredentials,
                FCMError::TokenExchangeFailed(_) => ErrorKind::TokenExchangeFailed,
                FCMError::SendRequestError(_) => ErrorKind::TransportFailure,
                FCMError::ApiError { .. } => ErrorKind::ProviderRejected,
                FCMError::ResponseParseError(_) => ErrorKind::ResponseParseFailed,
            },
            PushError::Apple(e) => match e {
                ApnsError::Certificate(_) => ErrorKind::InvalidCertificate,
                ApnsError::Config(_) => ErrorKind::InvalidConfig,
                ApnsError::SendRequestError(_) => ErrorKind::TransportFailure,
                ApnsError::Rejected { .. } => ErrorKind::ProviderRejected,
                ApnsError::ResponseParseError(_) => ErrorKind::ResponseParseFailed,
            },
        }
    }

    /// HTTP status paired with the error: the provider's own status for
    /// rejections, 500 for everything decided locally.
    pub fn status(&self) -> u16 {
        match self {
            PushError::Google(e) => e.status_code(),
            PushError::Apple(e) => e.status_code(),
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, PushError>;
