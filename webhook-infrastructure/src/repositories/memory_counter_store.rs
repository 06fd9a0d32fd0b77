use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use webhook_domain::{CounterError, CounterStore};

const SWEEP_THRESHOLD: usize = 10_000;

struct Counter {
    value: u64,
    expires_at: Option<Instant>,
}

impl Counter {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

struct Counters {
    entries: HashMap<String, Counter>,
    /// Size at which the next sweep of expired entries runs.
    sweep_at: usize,
}

impl Counters {
    // After a sweep the threshold moves past the live set, so a table full of
    // live keys is not rescanned on every increment.
    fn sweep_if_due(&mut self, now: Instant) {
        if self.entries.len() < self.sweep_at {
            return;
        }
        self.entries.retain(|_, counter| counter.is_live(now));
        self.sweep_at = SWEEP_THRESHOLD.max(self.entries.len().saturating_mul(2));
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            sweep_at: SWEEP_THRESHOLD,
        }
    }
}

/// Process-local counters. Used when no Redis URL is configured.
#[derive(Default)]
pub struct InMemoryCounterStore {
    counters: Mutex<Counters>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<u64> {
        let now = Instant::now();
        self.counters
            .lock()
            .await
            .entries
            .get(key)
            .filter(|counter| counter.is_live(now))
            .map(|counter| counter.value)
    }

    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.counters
            .lock()
            .await
            .entries
            .get(key)
            .filter(|counter| counter.is_live(now))
            .and_then(|counter| counter.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterError> {
        let now = Instant::now();
        let mut counters = self.counters.lock().await;
        counters.sweep_if_due(now);
        let counter = counters.entries.entry(key.to_string()).or_insert(Counter {
            value: 0,
            expires_at: None,
        });
        if !counter.is_live(now) {
            counter.value = 0;
            counter.expires_at = None;
        }
        counter.value += 1;
        if counter.value == 1 || counter.expires_at.is_none() {
            counter.expires_at = Some(now + ttl);
        }
        Ok(counter.value)
    }

    async fn seed(&self, key: &str, value: u64, ttl: Duration) -> Result<(), CounterError> {
        self.counters.lock().await.entries.insert(
            key.to_string(),
            Counter {
                value,
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), CounterError> {
        Ok(())
    }
}
