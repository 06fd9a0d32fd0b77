use anyhow::anyhow;
use tracing::{error, info, warn};

use webhook_domain::{
    is_fresh, is_supplied, signing_text, InboundEvent, NewEvent, PayloadError, StoreError,
};

use crate::{AppError, AppState, AuthFailure};

/// One inbound callback as seen by the admission gate.
#[derive(Debug, Clone, Copy)]
pub struct WebhookRequest<'a> {
    pub provider: &'a str,
    pub raw_body: &'a [u8],
    pub signature: Option<&'a str>,
    pub client_ip: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Persisted { event_id: i64 },
    Duplicate,
    /// Accepted and acknowledged, but the write failed.
    Unstored,
}

/// Runs the admission pipeline: size, shape, identity, replay window,
/// signature, then the idempotent insert.
pub async fn admit_event(state: &AppState, request: WebhookRequest<'_>) -> Result<Admission, AppError> {
    state.metrics.record_request();
    let result = run_pipeline(state, request).await;
    if let Err(err) = &result {
        if !matches!(err, AppError::Storage(_)) {
            state.metrics.record_rejected();
        }
    }
    result
}

async fn run_pipeline(state: &AppState, request: WebhookRequest<'_>) -> Result<Admission, AppError> {
    let config = &state.config;
    let client_ip = request.client_ip.unwrap_or_default();

    if !config.serves_provider(request.provider) {
        warn!(provider = %request.provider, client_ip, "unknown webhook provider");
        return Err(AppError::UnknownProvider(request.provider.to_string()));
    }

    if request.raw_body.len() > config.max_body_bytes {
        warn!(size = request.raw_body.len(), client_ip, "payload too large");
        return Err(AppError::PayloadTooLarge {
            size: request.raw_body.len(),
        });
    }

    let event = InboundEvent::from_slice(request.raw_body).map_err(|err| {
        warn!(client_ip, error = %err, "invalid json");
        match err {
            PayloadError::Malformed(inner) => AppError::InvalidJson(inner.to_string()),
            PayloadError::NotAnObject => AppError::InvalidJson(err.to_string()),
        }
    })?;

    info!(
        event_name = %event.event_name,
        app_id = %event.app_id,
        client_ip,
        "webhook received"
    );

    let signature_verified = if config.skip_signature_verification {
        info!("signature verification skipped (SKIP_SIGNATURE_VERIFICATION=true)");
        false
    } else {
        authenticate(state, &event, &request)?;
        true
    };

    let new_event = NewEvent::from_inbound(event, signature_verified, request.client_ip.map(str::to_string));
    persist(state, new_event).await
}

fn authenticate(
    state: &AppState,
    event: &InboundEvent,
    request: &WebhookRequest<'_>,
) -> Result<(), AppError> {
    let config = &state.config;
    let client_ip = request.client_ip.unwrap_or_default();

    if let Some(expected) = config.app_id.as_deref() {
        if !event.app_id.is_empty() && event.app_id != expected {
            warn!(client_ip, app_id = %event.app_id, "invalid app_id");
            return Err(AppError::Unauthorized(AuthFailure::InvalidAppId));
        }
    }

    let raw_timestamp = event.raw_timestamp.as_ref();
    if raw_timestamp.is_some_and(is_supplied)
        && !is_fresh(raw_timestamp, config.timestamp_tolerance_seconds)
    {
        warn!(client_ip, event_name = %event.event_name, "stale request");
        return Err(AppError::Unauthorized(AuthFailure::StaleRequest));
    }

    let signature = request.signature.unwrap_or_default();
    if signature.is_empty()
        || !state
            .verifier
            .verify(request.raw_body, signature, &signing_text(raw_timestamp))
    {
        warn!(client_ip, event_name = %event.event_name, "invalid signature");
        return Err(AppError::Unauthorized(AuthFailure::InvalidSignature));
    }

    Ok(())
}

async fn persist(state: &AppState, event: NewEvent) -> Result<Admission, AppError> {
    let msg_id = event.msg_id.clone();
    let event_name = event.event_name.clone();
    let store = state.event_store.clone();
    let store_timeout = state.config.store_timeout;

    // The write runs on its own task so a dropped request cannot cut it short.
    let write = tokio::spawn(async move {
        tokio::time::timeout(store_timeout, store.insert(event))
            .await
            .unwrap_or(Err(StoreError::Timeout))
    });
    let outcome = write
        .await
        .unwrap_or_else(|join_err| Err(StoreError::Unavailable(anyhow!("insert task failed: {join_err}"))));

    match outcome {
        Ok(event_id) => {
            state.metrics.record_stored();
            info!(event_id, event_name = %event_name, "event stored");
            Ok(Admission::Persisted { event_id })
        }
        Err(StoreError::DuplicateKey { msg_id }) => {
            state.metrics.record_duplicate();
            info!(msg_id = %msg_id, "duplicate event ignored");
            Ok(Admission::Duplicate)
        }
        Err(err) => {
            state.metrics.record_store_error();
            error!(error = %err, msg_id = ?msg_id, "failed to store event");
            if state.config.strict_storage {
                Err(AppError::Storage(err))
            } else {
                Ok(Admission::Unstored)
            }
        }
    }
}
