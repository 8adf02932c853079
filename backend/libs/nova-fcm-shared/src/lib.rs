//! Nova FCM Shared Library
//!
//! Firebase Cloud Messaging (FCM v1) client used by the Nova push adapter.
//!
//! It handles:
//! - Service account parsing and project id extraction
//! - OAuth2 token exchange with caching and automatic refresh
//! - Single message delivery with normalized results

pub mod client;
pub mod credentials;
pub mod errors;
pub mod models;
pub mod token;

pub use client::{FCMClient, FCM_ENDPOINT};
pub use credentials::{ServiceAccountKey, SigningConfig, FIREBASE_MESSAGING_SCOPE};
pub use errors::FCMError;
pub use models::{AndroidConfig, AndroidNotification, FCMSendResult, FcmApiError, FcmMessage};
pub use token::{AccessToken, ServiceAccountTokenSource, TokenCache, TokenSource};
