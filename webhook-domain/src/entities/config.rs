// Runtime configuration handed to the pipeline
// Built once at startup, shared read-only

use std::time::Duration;

pub const DEFAULT_MAX_BODY_BYTES: usize = 1_000_000;
pub const DEFAULT_TIMESTAMP_TOLERANCE_SECONDS: u64 = 300;
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u64 = 100;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub bind_addr: String,
    pub app_id: Option<String>,
    pub oa_secret_key: Option<String>,
    pub timestamp_tolerance_seconds: u64,
    pub rate_limit_per_minute: u64,
    pub skip_signature_verification: bool,
    pub strict_storage: bool,
    pub max_body_bytes: usize,
    pub request_timeout_seconds: u64,
    pub store_timeout: Duration,
    pub providers: Vec<String>,
}

impl WebhookConfig {
    pub fn serves_provider(&self, provider: &str) -> bool {
        self.providers
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(provider))
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            app_id: None,
            oa_secret_key: None,
            timestamp_tolerance_seconds: DEFAULT_TIMESTAMP_TOLERANCE_SECONDS,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            skip_signature_verification: false,
            strict_storage: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout_seconds: 10,
            store_timeout: Duration::from_millis(1500),
            providers: vec!["zalo".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub redis_url: Option<String>,
}
