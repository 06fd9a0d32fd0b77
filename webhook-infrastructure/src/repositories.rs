pub mod memory_counter_store;
pub mod memory_event_store;
pub mod postgres_event_store;
pub mod redis_counter_store;

pub use memory_counter_store::*;
pub use memory_event_store::*;
pub use postgres_event_store::*;
pub use redis_counter_store::*;
