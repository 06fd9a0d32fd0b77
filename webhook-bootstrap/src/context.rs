use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use webhook_application::AppState;
use webhook_domain::{CounterStore, EventStore, StorageConfig};
use webhook_infrastructure::{
    AppConfig, DefaultHealthService, InMemoryCounterStore, InMemoryEventStore, PostgresEventStore,
    RedisCounterStore,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = AppConfig::load(config_path).await?;
        let webhook_config = config.to_webhook_config();
        let storage = config.to_storage_config();

        let event_store = build_event_store(&storage).await?;
        let counter_store = build_counter_store(&storage).await?;
        let health_service = Arc::new(DefaultHealthService::new(
            event_store.clone(),
            counter_store.clone(),
        ));

        info!(
            providers = ?webhook_config.providers,
            rate_limit_per_minute = webhook_config.rate_limit_per_minute,
            strict_storage = webhook_config.strict_storage,
            "webhook receiver configured"
        );
        let state = AppState::new(webhook_config, event_store, counter_store, health_service);
        Ok(Self { state })
    }
}

pub async fn build_event_store(storage: &StorageConfig) -> Result<Arc<dyn EventStore>> {
    match &storage.database_url {
        Some(url) => {
            let store = PostgresEventStore::connect(url, storage.database_max_connections).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set, events are kept in memory only");
            Ok(Arc::new(InMemoryEventStore::new()))
        }
    }
}

pub async fn build_counter_store(storage: &StorageConfig) -> Result<Arc<dyn CounterStore>> {
    match &storage.redis_url {
        Some(url) => Ok(Arc::new(RedisCounterStore::connect(url).await?)),
        None => {
            warn!("REDIS_URL not set, rate limits are per process");
            Ok(Arc::new(InMemoryCounterStore::new()))
        }
    }
}
