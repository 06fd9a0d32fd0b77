// Stored event entity
// Rows owned by the event store; the receiver only creates them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::{clip, InboundEvent};
use crate::value_objects::EventStatus;

/// Upper bound for the stored client address. Forwarded-for values are taken
/// as sent, so this bounds the column rather than describing an IP.
pub const CLIENT_IP_MAX_CHARS: usize = 255;

/// Row to be inserted. `received_at` and the id are assigned by the store.
#[derive(Debug, Clone, Serialize)]
pub struct NewEvent {
    pub event_name: String,
    pub msg_id: Option<String>,
    pub app_id: String,
    pub oa_id: Option<String>,
    pub user_id: Option<String>,
    pub payload: Value,
    pub timestamp: i64,
    pub signature_verified: bool,
    pub client_ip: Option<String>,
}

impl NewEvent {
    pub fn from_inbound(event: InboundEvent, signature_verified: bool, client_ip: Option<String>) -> Self {
        Self {
            event_name: event.event_name,
            msg_id: event.msg_id,
            app_id: event.app_id,
            oa_id: event.oa_id,
            user_id: event.user_id,
            payload: event.payload,
            timestamp: event.timestamp,
            signature_verified,
            client_ip: client_ip
                .filter(|ip| !ip.is_empty())
                .map(|ip| clip(&ip, CLIENT_IP_MAX_CHARS)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: i64,
    pub event_name: String,
    pub msg_id: Option<String>,
    pub app_id: String,
    pub oa_id: Option<String>,
    pub user_id: Option<String>,
    pub payload: Value,
    pub timestamp: i64,
    pub status: EventStatus,
    pub signature_verified: bool,
    pub client_ip: Option<String>,
    pub received_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub error_message: String,
    pub retry_count: i16,
}

impl StoredEvent {
    /// Materializes a freshly inserted row with the initial lifecycle values.
    pub fn received(id: i64, event: NewEvent, received_at: DateTime<Utc>) -> Self {
        Self {
            id,
            event_name: event.event_name,
            msg_id: event.msg_id,
            app_id: event.app_id,
            oa_id: event.oa_id,
            user_id: event.user_id,
            payload: event.payload,
            timestamp: event.timestamp,
            status: EventStatus::Received,
            signature_verified: event.signature_verified,
            client_ip: event.client_ip,
            received_at,
            processed_at: None,
            error_message: String::new(),
            retry_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn inbound() -> InboundEvent {
        InboundEvent::from_payload(json!({"event_name": "user_send_text", "app_id": "app"}))
            .expect("object payload")
    }

    #[test]
    fn long_forwarded_client_is_kept_but_bounded() {
        let forwarded = format!("spoofed-{}", "a".repeat(400));
        let event = NewEvent::from_inbound(inbound(), true, Some(forwarded.clone()));

        let stored = event.client_ip.expect("client ip");
        assert_eq!(stored.chars().count(), CLIENT_IP_MAX_CHARS);
        assert!(forwarded.starts_with(&stored));
    }

    #[test]
    fn empty_client_is_dropped() {
        let event = NewEvent::from_inbound(inbound(), false, Some(String::new()));
        assert!(event.client_ip.is_none());
    }

    #[test]
    fn received_row_starts_unprocessed() {
        let event = NewEvent::from_inbound(inbound(), true, Some("10.0.0.1".to_string()));
        let row = StoredEvent::received(7, event, chrono::Utc::now());

        assert_eq!(row.status, EventStatus::Received);
        assert_eq!(row.client_ip.as_deref(), Some("10.0.0.1"));
        assert!(row.processed_at.is_none());
        assert_eq!(row.retry_count, 0);
    }
}
