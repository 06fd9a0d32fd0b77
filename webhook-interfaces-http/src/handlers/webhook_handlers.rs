use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::{header, Extensions, HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use webhook_application::commands::admit_commands::{self, Admission, WebhookRequest};
use webhook_application::AppState;

use crate::error::HttpError;
use crate::middleware::client_key;

pub const SIGNATURE_HEADER: &str = "x-zevent-signature";

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

// Requests turned away before reaching the admission gate still count as requests.
fn record_early_rejection(state: &AppState) {
    state.metrics.record_request();
    state.metrics.record_rejected();
}

/// `POST /webhook/:provider/`
///
/// The body is buffered up to one byte past the configured limit so the
/// gate can tell an exact-size payload from an oversized one.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    extensions: Extensions,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, HttpError> {
    let client = client_key(&headers, &extensions);
    let limit = state.config.max_body_bytes;

    if let Some(length) = declared_length(&headers).filter(|length| *length > limit) {
        record_early_rejection(&state);
        warn!(client_ip = %client, size = length, "payload too large");
        return Err(HttpError::PayloadTooLarge);
    }

    let body = body.map_err(|rejection| {
        record_early_rejection(&state);
        warn!(client_ip = %client, error = %rejection, "failed to read webhook body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            HttpError::PayloadTooLarge
        } else {
            HttpError::InvalidJson
        }
    })?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let request = WebhookRequest {
        provider: &provider,
        raw_body: &body,
        signature,
        client_ip: Some(client.as_str()).filter(|ip| !ip.is_empty()),
    };

    let response = match admit_commands::admit_event(&state, request).await? {
        Admission::Persisted { event_id } => json!({"status": "received", "event_id": event_id}),
        Admission::Duplicate => json!({"status": "duplicate"}),
        Admission::Unstored => json!({"status": "received", "stored": false}),
    };
    Ok(Json(response))
}
