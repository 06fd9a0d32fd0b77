use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use webhook_application::commands::rate_limit_commands::RateDecision;
use webhook_application::{AppError, AppState};

use crate::error::HttpError;
use crate::middleware::client_key;

/// Counts the request against its client before the body is read.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(request.headers(), request.extensions());
    match state.rate_limiter.check(&client).await {
        RateDecision::Blocked { count } => {
            state.metrics.record_rate_limited();
            warn!(
                client_ip = %client,
                count,
                limit = state.rate_limiter.limit(),
                "rate limit exceeded"
            );
            HttpError::from(AppError::RateLimited).into_response()
        }
        RateDecision::FailedOpen => {
            state.metrics.record_counter_error();
            next.run(request).await
        }
        RateDecision::Allowed { .. } => next.run(request).await,
    }
}
