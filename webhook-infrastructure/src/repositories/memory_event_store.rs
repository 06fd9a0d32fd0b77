use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use webhook_domain::{EventStore, NewEvent, StoreError, StoredEvent};

#[derive(Default)]
struct Table {
    rows: Vec<StoredEvent>,
    by_msg_id: HashMap<String, i64>,
}

/// Process-local event table. Used when no database URL is configured.
#[derive(Default)]
pub struct InMemoryEventStore {
    table: Mutex<Table>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn find_by_msg_id(&self, msg_id: &str) -> Option<StoredEvent> {
        let table = self.table.lock().await;
        let id = *table.by_msg_id.get(msg_id)?;
        table.rows.iter().find(|row| row.id == id).cloned()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert(&self, event: NewEvent) -> Result<i64, StoreError> {
        let mut table = self.table.lock().await;
        if let Some(msg_id) = &event.msg_id {
            if table.by_msg_id.contains_key(msg_id) {
                return Err(StoreError::DuplicateKey {
                    msg_id: msg_id.clone(),
                });
            }
        }
        let id = table.rows.len() as i64 + 1;
        if let Some(msg_id) = &event.msg_id {
            table.by_msg_id.insert(msg_id.clone(), id);
        }
        table.rows.push(StoredEvent::received(id, event, Utc::now()));
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<StoredEvent>, StoreError> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().find(|row| row.id == id).cloned())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.table.lock().await.rows.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
