use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys APNs interprets inside the `aps` dictionary.
pub const RESERVED_APS_KEYS: [&str; 5] = ["alert", "badge", "category", "mutable-content", "sound"];

/// Top-level key of the app-specific data block.
pub const CUSTOM_DATA_KEY: &str = "her";

/// JSON body sent to APNs: the `aps` dictionary plus one custom block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApnsPayload {
    pub aps: Map<String, Value>,
    #[serde(rename = "her")]
    pub custom: Map<String, Value>,
}

/// A notification ready to hand to [`crate::ApnsClient`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApnsNotification {
    pub device_token: String,
    /// `apns-topic`; empty falls back to the client's default topic
    pub topic: String,
    /// `apns-collapse-id`; empty is not sent
    pub collapse_id: String,
    /// `None` leaves `apns-expiration` off and APNs applies its default storage
    pub expiration: Option<DateTime<Utc>>,
    /// Raw `apns-priority` value; zero or less is not sent
    pub priority: i32,
    pub payload: ApnsPayload,
}

impl ApnsNotification {
    /// Value of the `apns-expiration` header, UNIX seconds; `None` when unset.
    pub fn expiration_header(&self) -> Option<i64> {
        self.expiration.map(|t| t.timestamp())
    }
}

/// APNs Send Result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApnsSendResult {
    pub message_id: String,
    pub status: u16,
}

/// Error body APNs returns on non-200 responses
#[derive(Debug, Deserialize)]
pub(crate) struct ApnsErrorBody {
    pub(crate) reason: String,
    #[serde(default)]
    pub(crate) timestamp: Option<i64>,
}

/// Success body, only consulted when the `apns-id` header is absent
#[derive(Debug, Deserialize)]
pub(crate) struct ApnsSuccessBody {
    #[serde(default, alias = "apns_id", alias = "apns-id")]
    pub(crate) id: Option<String>,
}
