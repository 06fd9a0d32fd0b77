use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use webhook_application::AppError;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Unknown provider")]
    UnknownProvider,
    #[error("Internal server error")]
    Internal,
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::PayloadTooLarge { .. } => HttpError::PayloadTooLarge,
            AppError::InvalidJson(_) => HttpError::InvalidJson,
            AppError::Unauthorized(failure) => HttpError::Unauthorized(failure.message()),
            AppError::RateLimited => HttpError::RateLimited,
            AppError::UnknownProvider(_) => HttpError::UnknownProvider,
            AppError::Storage(_) => HttpError::Internal,
        }
    }
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            HttpError::InvalidJson => StatusCode::BAD_REQUEST,
            HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            HttpError::UnknownProvider => StatusCode::NOT_FOUND,
            HttpError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use webhook_application::AuthFailure;
    use webhook_domain::StoreError;

    use super::*;

    #[test]
    fn app_errors_map_to_client_facing_statuses() {
        let cases = [
            (AppError::PayloadTooLarge { size: 2 }, StatusCode::PAYLOAD_TOO_LARGE, "Payload too large"),
            (AppError::InvalidJson("eof".into()), StatusCode::BAD_REQUEST, "Invalid JSON"),
            (
                AppError::Unauthorized(AuthFailure::StaleRequest),
                StatusCode::UNAUTHORIZED,
                "Stale request",
            ),
            (AppError::RateLimited, StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded"),
            (AppError::UnknownProvider("x".into()), StatusCode::NOT_FOUND, "Unknown provider"),
            (
                AppError::Storage(StoreError::Timeout),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ),
        ];
        for (app_error, status, message) in cases {
            let http_error = HttpError::from(app_error);
            assert_eq!(http_error.status(), status);
            assert_eq!(http_error.to_string(), message);
        }
    }
}
