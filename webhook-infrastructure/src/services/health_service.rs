use std::sync::Arc;

use async_trait::async_trait;
use webhook_domain::ports::{CounterStore, EventStore, HealthCheckService};

pub struct DefaultHealthService {
    event_store: Arc<dyn EventStore>,
    counter_store: Arc<dyn CounterStore>,
}

impl DefaultHealthService {
    pub fn new(event_store: Arc<dyn EventStore>, counter_store: Arc<dyn CounterStore>) -> Self {
        Self {
            event_store,
            counter_store,
        }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_event_store(&self) -> anyhow::Result<bool> {
        self.event_store.ping().await.map(|_| true).map_err(Into::into)
    }

    async fn check_counter_store(&self) -> anyhow::Result<bool> {
        self.counter_store.ping().await.map(|_| true).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryCounterStore, InMemoryEventStore};

    #[tokio::test]
    async fn in_memory_stores_report_healthy() {
        let service = DefaultHealthService::new(
            Arc::new(InMemoryEventStore::new()),
            Arc::new(InMemoryCounterStore::new()),
        );
        assert!(service.check_event_store().await.expect("event store"));
        assert!(service.check_counter_store().await.expect("counter store"));
    }
}
