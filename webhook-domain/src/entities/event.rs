// Inbound event entity
// Parsed from the raw callback body, never mutated afterwards

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::value_objects::parse_unix_seconds;

pub const EVENT_NAME_MAX_CHARS: usize = 100;
pub const APP_ID_MAX_CHARS: usize = 100;
pub const MSG_ID_MAX_CHARS: usize = 255;
pub const USER_ID_MAX_CHARS: usize = 100;
pub const OA_ID_MAX_CHARS: usize = 100;
pub const DEFAULT_EVENT_NAME: &str = "unknown";

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed json: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("payload is not a json object")]
    NotAnObject,
}

#[derive(Debug, Clone, Serialize)]
pub struct InboundEvent {
    pub event_name: String,
    pub app_id: String,
    /// Unix seconds, 0 when absent or unparseable.
    pub timestamp: i64,
    /// The timestamp field exactly as sent, used for replay and signature checks.
    #[serde(skip)]
    pub raw_timestamp: Option<Value>,
    pub msg_id: Option<String>,
    pub user_id: Option<String>,
    pub oa_id: Option<String>,
    pub payload: Value,
}

impl InboundEvent {
    pub fn from_slice(raw_body: &[u8]) -> Result<Self, PayloadError> {
        let payload: Value = serde_json::from_slice(raw_body)?;
        Self::from_payload(payload)
    }

    pub fn from_payload(payload: Value) -> Result<Self, PayloadError> {
        let root = payload.as_object().ok_or(PayloadError::NotAnObject)?;

        let event_name = field_text(root, "event_name")
            .map(|name| clip(&name, EVENT_NAME_MAX_CHARS))
            .unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string());
        let app_id = field_text(root, "app_id")
            .map(|id| clip(&id, APP_ID_MAX_CHARS))
            .unwrap_or_default();
        let raw_timestamp = root.get("timestamp").filter(|v| !v.is_null()).cloned();
        let timestamp = raw_timestamp
            .as_ref()
            .and_then(parse_unix_seconds)
            .unwrap_or(0);

        let msg_id = nested_text(root, "message", "msg_id", MSG_ID_MAX_CHARS);
        let user_id = nested_text(root, "sender", "id", USER_ID_MAX_CHARS);
        let oa_id = field_text(root, "oa_id")
            .map(|id| clip(&id, OA_ID_MAX_CHARS))
            .filter(|id| !id.is_empty());

        Ok(Self {
            event_name,
            app_id,
            timestamp,
            raw_timestamp,
            msg_id,
            user_id,
            oa_id,
            payload,
        })
    }
}

/// Clips to at most `max_chars` characters. Never fails.
pub fn clip(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

fn field_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn nested_text(
    map: &Map<String, Value>,
    parent: &str,
    key: &str,
    max_chars: usize,
) -> Option<String> {
    let inner = map.get(parent)?.as_object()?;
    field_text(inner, key)
        .map(|text| clip(&text, max_chars))
        .filter(|text| !text.is_empty())
}
