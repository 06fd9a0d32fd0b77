pub mod client_ip;
pub mod rate_limit;
pub mod request_logging;

pub use client_ip::*;
pub use rate_limit::*;
pub use request_logging::*;
