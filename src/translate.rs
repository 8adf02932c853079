//! Message translation into provider payloads.
//!
//! Both functions are pure reads of the [`Message`]; the only input outside
//! the message is the wall clock used for the APNs expiration.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use nova_apns_shared::{ApnsNotification, ApnsPayload, RESERVED_APS_KEYS};
use nova_fcm_shared::{AndroidConfig, AndroidNotification, FcmMessage};
use serde_json::{Map, Value};

use crate::message::{Destination, Message};

/// Build the FCM v1 message.
///
/// `data` is flattened to strings: strings are kept as-is, other values are
/// rendered as JSON text and `null` entries are dropped.
pub fn to_fcm(message: &Message) -> FcmMessage {
    let destination = message.google.clone().unwrap_or_default();

    let data: BTreeMap<String, String> = message
        .data
        .iter()
        .filter_map(|(k, v)| stringify(v).map(|s| (k.clone(), s)))
        .collect();

    FcmMessage {
        token: non_empty(&destination.device),
        topic: non_empty(&destination.topic),
        android: Some(AndroidConfig {
            collapse_key: non_empty(&message.collapse_id),
            priority: non_empty(message.priority.as_str()),
            ttl: Some(message.ttl).filter(|ttl| !ttl.is_zero()),
            data,
            notification: Some(AndroidNotification {
                title: message.title.clone(),
                body: message.body.clone(),
            }),
        }),
    }
}

/// Build the APNs notification, expiring `ttl` from now.
pub fn to_apns(message: &Message) -> ApnsNotification {
    to_apns_at(message, Utc::now())
}

/// Build the APNs notification with an explicit clock.
///
/// Reserved keys (`alert`, `badge`, ...) go to `aps` only; every other data
/// key is written to both `aps` and the custom block, which is what existing
/// app builds read.
pub fn to_apns_at(message: &Message, now: DateTime<Utc>) -> ApnsNotification {
    let Destination { topic, device } = message.apple.clone().unwrap_or_default();

    let mut aps = Map::new();
    let mut custom = Map::new();
    for (key, value) in message.data.iter().filter(|(_, v)| !v.is_null()) {
        aps.insert(key.clone(), value.clone());
        if !RESERVED_APS_KEYS.contains(&key.as_str()) {
            custom.insert(key.clone(), value.clone());
        }
    }

    // TTLs past chrono's range saturate rather than reading as unset.
    let expiration = if message.ttl.is_zero() {
        None
    } else {
        let expires = chrono::Duration::from_std(message.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Some(expires)
    };

    ApnsNotification {
        device_token: device,
        topic,
        collapse_id: message.collapse_id.clone(),
        expiration,
        priority: message.priority.0,
        payload: ApnsPayload { aps, custom },
    }
}

impl Message {
    pub fn to_fcm(&self) -> FcmMessage {
        to_fcm(self)
    }

    pub fn to_apns(&self) -> ApnsNotification {
        to_apns(self)
    }
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn non_empty(s: &str) -> Option<String> {
    Some(s).filter(|s| !s.is_empty()).map(str::to_string)
}
