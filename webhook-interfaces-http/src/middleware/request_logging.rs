use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info};

use crate::middleware::client_key;

pub async fn log_webhook_requests(request: Request, next: Next) -> Response {
    if !request.uri().path().starts_with("/webhook") {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client = client_key(request.headers(), request.extensions());
    debug!(%method, %path, client_ip = %client, "webhook request");

    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        %method,
        %path,
        client_ip = %client,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "webhook response"
    );
    response
}
