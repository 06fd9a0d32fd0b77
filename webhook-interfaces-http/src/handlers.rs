pub mod health_handlers;
pub mod webhook_handlers;

pub use health_handlers::*;
pub use webhook_handlers::*;
