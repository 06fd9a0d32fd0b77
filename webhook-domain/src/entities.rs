// Domain entities
pub mod config;
pub mod event;
pub mod stored_event;

pub use config::*;
pub use event::*;
pub use stored_event::*;
