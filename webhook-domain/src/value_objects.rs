// Domain value objects
pub mod client_key;
pub mod event_status;
pub mod timestamp;

pub use client_key::*;
pub use event_status::*;
pub use timestamp::*;
