//! The provider-neutral notification model.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which push service a destination or sender belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Apple,
    Google,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Apple => f.write_str("apple"),
            Platform::Google => f.write_str("google"),
        }
    }
}

/// Recipient: a broadcast topic, a single device, or both.
///
/// An empty device with a non-empty topic is topic delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topic: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device: String,
}

impl Destination {
    pub fn device(token: impl Into<String>) -> Self {
        Self {
            topic: String::new(),
            device: token.into(),
        }
    }

    pub fn topic(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            device: String::new(),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }
}

/// Message priority as an APNs style ordinal.
///
/// Any `i32` is accepted; values outside `(0, HIGH]` simply have no
/// string form.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    pub const NORMAL: Priority = Priority(5);
    pub const HIGH: Priority = Priority(10);

    /// `"normal"` for `(0, NORMAL]`, `"high"` for `(NORMAL, HIGH]`, else `""`.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            p if p > 0 && p <= Self::NORMAL.0 => "normal",
            p if p > Self::NORMAL.0 && p <= Self::HIGH.0 => "high",
            _ => "",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification addressed to Apple, Google, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apple: Option<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<Destination>,

    #[serde(default, skip_serializing_if = "is_unset_priority")]
    pub priority: Priority,
    /// Zero means provider default (no expiration)
    #[serde(default, skip_serializing_if = "Duration::is_zero", with = "ttl_nanos")]
    pub ttl: Duration,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub collapse_id: String,

    /// Free-form custom data. `null` values are dropped on translation.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, serde_json::Value>,
}

fn is_unset_priority(p: &Priority) -> bool {
    p.0 == 0
}

impl Message {
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    pub fn destination(&self, platform: Platform) -> Option<&Destination> {
        match platform {
            Platform::Apple => self.apple.as_ref(),
            Platform::Google => self.google.as_ref(),
        }
    }
}

/// Builder for [`Message`].
#[derive(Debug, Default)]
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    pub fn apple(mut self, destination: Destination) -> Self {
        self.message.apple = Some(destination);
        self
    }

    pub fn google(mut self, destination: Destination) -> Self {
        self.message.google = Some(destination);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.message.priority = priority;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.message.ttl = ttl;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.message.title = title.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.message.body = body.into();
        self
    }

    pub fn collapse_id(mut self, collapse_id: impl Into<String>) -> Self {
        self.message.collapse_id = collapse_id.into();
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.message.data.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Message {
        self.message
    }
}

/// TTL on the wire is an integer count of nanoseconds.
mod ttl_nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(ttl.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        // Negative durations mean "unset".
        let nanos = i64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos.max(0) as u64))
    }
}
