// Scriptable store doubles for application tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::Instant;

use webhook_domain::{
    CounterError, CounterStore, EventStore, HealthCheckService, NewEvent, StoreError, StoredEvent,
    WebhookConfig,
};

use crate::AppState;

#[derive(Default)]
pub struct FakeCounterStore {
    entries: Mutex<HashMap<String, (u64, Option<Instant>)>>,
    next_error: Mutex<Option<CounterError>>,
    delay: Mutex<Option<Duration>>,
}

impl FakeCounterStore {
    pub fn fail_next_increment(&self, err: CounterError) {
        *self.next_error.lock().expect("lock") = Some(err);
    }

    pub fn delay_increments(&self, delay: Duration) {
        *self.delay.lock().expect("lock") = Some(delay);
    }

    pub fn value(&self, key: &str) -> Option<u64> {
        self.entries.lock().expect("lock").get(key).map(|(value, _)| *value)
    }

    pub fn has_expiry(&self, key: &str) -> bool {
        self.entries
            .lock()
            .expect("lock")
            .get(key)
            .map(|(_, expires)| expires.is_some())
            .unwrap_or(false)
    }
}

#[async_trait]
impl CounterStore for FakeCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterError> {
        let delay = *self.delay.lock().expect("lock");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.next_error.lock().expect("lock").take() {
            return Err(err);
        }
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("lock");
        let entry = entries.entry(key.to_string()).or_insert((0, None));
        if entry.1.is_some_and(|expires| expires <= now) {
            *entry = (0, None);
        }
        entry.0 += 1;
        if entry.0 == 1 || entry.1.is_none() {
            entry.1 = Some(now + ttl);
        }
        Ok(entry.0)
    }

    async fn seed(&self, key: &str, value: u64, ttl: Duration) -> Result<(), CounterError> {
        self.entries
            .lock()
            .expect("lock")
            .insert(key.to_string(), (value, Some(Instant::now() + ttl)));
        Ok(())
    }

    async fn ping(&self) -> Result<(), CounterError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeEventStore {
    rows: Mutex<Vec<StoredEvent>>,
    fail_inserts: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl FakeEventStore {
    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    pub fn delay_inserts(&self, delay: Duration) {
        *self.delay.lock().expect("lock") = Some(delay);
    }

    pub fn rows(&self) -> Vec<StoredEvent> {
        self.rows.lock().expect("lock").clone()
    }
}

#[async_trait]
impl EventStore for FakeEventStore {
    async fn insert(&self, event: NewEvent) -> Result<i64, StoreError> {
        let delay = *self.delay.lock().expect("lock");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(anyhow::anyhow!("database is down")));
        }
        let mut rows = self.rows.lock().expect("lock");
        if let Some(msg_id) = &event.msg_id {
            if rows.iter().any(|row| row.msg_id.as_ref() == Some(msg_id)) {
                return Err(StoreError::DuplicateKey {
                    msg_id: msg_id.clone(),
                });
            }
        }
        let id = rows.len() as i64 + 1;
        rows.push(StoredEvent::received(id, event, Utc::now()));
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<StoredEvent>, StoreError> {
        Ok(self.rows.lock().expect("lock").iter().find(|row| row.id == id).cloned())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.rows.lock().expect("lock").len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct StaticHealth {
    pub event_store: bool,
    pub counter_store: bool,
}

#[async_trait]
impl HealthCheckService for StaticHealth {
    async fn check_event_store(&self) -> anyhow::Result<bool> {
        if self.event_store {
            Ok(true)
        } else {
            Err(anyhow::anyhow!("event store unreachable"))
        }
    }

    async fn check_counter_store(&self) -> anyhow::Result<bool> {
        Ok(self.counter_store)
    }
}

pub struct Harness {
    pub state: AppState,
    pub events: Arc<FakeEventStore>,
    pub counters: Arc<FakeCounterStore>,
}

pub fn test_config() -> WebhookConfig {
    WebhookConfig {
        app_id: Some("test_app_123".to_string()),
        oa_secret_key: Some("test_secret_456".to_string()),
        store_timeout: Duration::from_millis(500),
        ..WebhookConfig::default()
    }
}

pub fn harness(config: WebhookConfig) -> Harness {
    let events = Arc::new(FakeEventStore::default());
    let counters = Arc::new(FakeCounterStore::default());
    let health = Arc::new(StaticHealth {
        event_store: true,
        counter_store: true,
    });
    let state = AppState::new(config, events.clone(), counters.clone(), health);
    Harness {
        state,
        events,
        counters,
    }
}
