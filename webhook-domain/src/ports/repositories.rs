use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::entities::{NewEvent, StoredEvent};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate msg_id '{msg_id}'")]
    DuplicateKey { msg_id: String },
    #[error("event store timed out")]
    Timeout,
    #[error("event store unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("counter key absent")]
    KeyAbsent,
    #[error("counter store timed out")]
    Timeout,
    #[error("counter store unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

/// Durable event rows with a uniqueness constraint on `msg_id`.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Inserts one row atomically. Fails with [`StoreError::DuplicateKey`]
    /// when a row with the same non-null `msg_id` exists.
    async fn insert(&self, event: NewEvent) -> Result<i64, StoreError>;
    async fn get(&self, id: i64) -> Result<Option<StoredEvent>, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Shared counters with expiry.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increments `key` and returns the new value. When the increment created
    /// the counter, or the counter carries no expiry, `ttl` is applied in the
    /// same atomic step.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterError>;
    /// Overwrites `key` with `value` and `ttl`.
    async fn seed(&self, key: &str, value: u64, ttl: Duration) -> Result<(), CounterError>;
    async fn ping(&self) -> Result<(), CounterError>;
}
