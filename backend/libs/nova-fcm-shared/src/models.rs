use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// FCM Send Result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FCMSendResult {
    /// Resource name FCM assigned, `projects/{id}/messages/{message_id}`
    pub message_id: String,
    pub status: u16,
}

/// FCM v1 request envelope
#[derive(Debug, Serialize)]
pub struct FcmRequest<'a> {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub validate_only: bool,
    pub message: &'a FcmMessage,
}

/// FCM v1 message
///
/// Exactly one of `token` or `topic` is expected by FCM; both are carried
/// through as-is and FCM decides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcmMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,
}

/// Android specific delivery options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapse_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "duration_string"
    )]
    pub ttl: Option<Duration>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<AndroidNotification>,
}

/// FCM Notification Payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidNotification {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

/// FCM API Response
#[derive(Debug, Deserialize)]
pub struct FcmApiResponse {
    #[serde(default)]
    pub name: String,
}

/// Error envelope FCM returns on non-200 responses
#[derive(Debug, Deserialize)]
pub struct FcmErrorResponse {
    pub error: FcmApiError,
}

/// Google API error body, kept verbatim for the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcmApiError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    /// Canonical status such as `INVALID_ARGUMENT` or `UNREGISTERED`
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

/// Google protobuf `Duration` JSON form: seconds with an `s` suffix and up
/// to nine fractional digits, e.g. `3600s` or `1.500000000s`.
pub mod duration_string {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn format(d: &Duration) -> String {
        if d.subsec_nanos() > 0 {
            format!("{}.{:09}s", d.as_secs(), d.subsec_nanos())
        } else {
            format!("{}s", d.as_secs())
        }
    }

    pub fn parse(s: &str) -> Option<Duration> {
        let raw = s.strip_suffix('s')?;
        let (secs, frac) = match raw.split_once('.') {
            Some((secs, frac)) => (secs, frac),
            None => (raw, ""),
        };
        let secs: u64 = secs.parse().ok()?;
        if frac.len() > 9 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let nanos = if frac.is_empty() {
            0
        } else {
            format!("{:0<9}", frac).parse::<u32>().ok()?
        };
        Some(Duration::new(secs, nanos))
    }

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_str(&format(d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid duration: {s}"))),
            None => Ok(None),
        }
    }
}
