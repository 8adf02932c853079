use thiserror::Error;

use crate::models::FcmApiError;

/// FCM Client Error Types
#[derive(Error, Debug)]
pub enum FCMError {
    #[error("project_id is missing from service account credentials")]
    MissingProjectId,

    #[error("Invalid service account credentials: {0}")]
    InvalidCredentials(String),

    #[error("Failed to get access token: {0}")]
    TokenExchangeFailed(String),

    #[error("FCM send request failed: {0}")]
    SendRequestError(#[source] reqwest::Error),

    #[error("FCM API error: {status} - {}", .error.message)]
    ApiError { status: u16, error: FcmApiError },

    #[error("Failed to parse FCM response: {0}")]
    ResponseParseError(String),
}

impl FCMError {
    /// HTTP status to report alongside the error.
    ///
    /// Provider rejections keep the status FCM answered with; every local
    /// failure reports 500.
    pub fn status_code(&self) -> u16 {
        match self {
            FCMError::ApiError { status, .. } => *status,
            _ => 500,
        }
    }
}
