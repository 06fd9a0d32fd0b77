// Pure domain services
pub mod replay_guard;
pub mod signature;

pub use replay_guard::*;
pub use signature::*;
