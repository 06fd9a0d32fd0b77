use async_trait::async_trait;

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_event_store(&self) -> anyhow::Result<bool>;
    async fn check_counter_store(&self) -> anyhow::Result<bool>;
}
