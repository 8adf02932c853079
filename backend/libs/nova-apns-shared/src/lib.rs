//! Nova APNs Shared Library
//!
//! Apple Push Notification Service (APNs) client used by the Nova push
//! adapter for iOS and macOS devices.
//!
//! It handles:
//! - Certificate loading (PKCS#12 or PEM) and environment selection
//! - HTTP/2 delivery with the `apns-*` request headers
//! - Normalizing APNs answers into an id or a rejection reason
pub mod certificate;
pub mod client;
pub mod config;
pub mod models;

pub use client::{ApnsClient, ApnsError};
pub use config::{ApnsConfig, ApnsEnvironment, CertificateSource};
pub use models::{ApnsNotification, ApnsPayload, ApnsSendResult, RESERVED_APS_KEYS};
