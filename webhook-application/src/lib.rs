// Webhook Application Layer

pub mod commands;
pub mod error;
pub mod metrics;
pub mod queries;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AppError, AuthFailure};
pub use metrics::Metrics;
pub use state::AppState;
