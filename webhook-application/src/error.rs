use thiserror::Error;
use webhook_domain::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    InvalidAppId,
    StaleRequest,
    InvalidSignature,
}

impl AuthFailure {
    pub fn message(&self) -> &'static str {
        match self {
            AuthFailure::InvalidAppId => "Invalid app_id",
            AuthFailure::StaleRequest => "Stale request",
            AuthFailure::InvalidSignature => "Invalid signature",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("payload too large: {size} bytes")]
    PayloadTooLarge { size: usize },
    #[error("invalid json: {0}")]
    InvalidJson(String),
    #[error("unauthorized: {}", .0.message())]
    Unauthorized(AuthFailure),
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),
    #[error("storage failure: {0}")]
    Storage(#[source] StoreError),
}
