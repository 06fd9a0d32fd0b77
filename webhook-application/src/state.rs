use std::sync::Arc;

use webhook_domain::ports::{CounterStore, EventStore, HealthCheckService};
use webhook_domain::{SignatureVerifier, WebhookConfig};

use crate::commands::rate_limit_commands::RateLimiter;
use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WebhookConfig>,
    pub event_store: Arc<dyn EventStore>,
    pub counter_store: Arc<dyn CounterStore>,
    pub health_service: Arc<dyn HealthCheckService>,
    pub verifier: Arc<SignatureVerifier>,
    pub rate_limiter: Arc<RateLimiter>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        config: WebhookConfig,
        event_store: Arc<dyn EventStore>,
        counter_store: Arc<dyn CounterStore>,
        health_service: Arc<dyn HealthCheckService>,
    ) -> Self {
        let verifier = SignatureVerifier::new(config.app_id.clone(), config.oa_secret_key.clone());
        let rate_limiter = RateLimiter::new(
            counter_store.clone(),
            config.rate_limit_per_minute,
            config.store_timeout,
        );
        Self {
            config: Arc::new(config),
            event_store,
            counter_store,
            health_service,
            verifier: Arc::new(verifier),
            rate_limiter: Arc::new(rate_limiter),
            metrics: Arc::new(Metrics::default()),
        }
    }
}
