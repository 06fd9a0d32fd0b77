use serde::Serialize;
use tokio::time::timeout;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    pub event_store: bool,
    pub counter_store: bool,
}

impl ReadinessReport {
    pub fn is_ready(&self) -> bool {
        self.event_store && self.counter_store
    }
}

/// Probes both stores. A probe that errors or exceeds the store timeout counts as down.
pub async fn readiness(state: &AppState) -> ReadinessReport {
    let limit = state.config.store_timeout;

    let event_store = match timeout(limit, state.health_service.check_event_store()).await {
        Ok(Ok(up)) => up,
        Ok(Err(err)) => {
            warn!(error = %err, "event store health check failed");
            false
        }
        Err(_) => {
            warn!("event store health check timed out");
            false
        }
    };

    let counter_store = match timeout(limit, state.health_service.check_counter_store()).await {
        Ok(Ok(up)) => up,
        Ok(Err(err)) => {
            warn!(error = %err, "counter store health check failed");
            false
        }
        Err(_) => {
            warn!("counter store health check timed out");
            false
        }
    };

    ReadinessReport {
        event_store,
        counter_store,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::{test_config, FakeCounterStore, FakeEventStore, StaticHealth};

    fn state_with(health: StaticHealth) -> AppState {
        AppState::new(
            test_config(),
            Arc::new(FakeEventStore::default()),
            Arc::new(FakeCounterStore::default()),
            Arc::new(health),
        )
    }

    #[tokio::test]
    async fn ready_when_both_stores_answer() {
        let state = state_with(StaticHealth {
            event_store: true,
            counter_store: true,
        });
        let report = readiness(&state).await;
        assert!(report.is_ready());
    }

    #[tokio::test]
    async fn failing_probe_marks_store_down() {
        let state = state_with(StaticHealth {
            event_store: false,
            counter_store: true,
        });
        let report = readiness(&state).await;
        assert_eq!(
            report,
            ReadinessReport {
                event_store: false,
                counter_store: true,
            }
        );
        assert!(!report.is_ready());
    }
}
