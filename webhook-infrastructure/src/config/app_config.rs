use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use webhook_domain::{
    StorageConfig, WebhookConfig, DEFAULT_MAX_BODY_BYTES, DEFAULT_RATE_LIMIT_PER_MINUTE,
    DEFAULT_TIMESTAMP_TOLERANCE_SECONDS,
};

use super::validation::{parse_flag, parse_list, validate_provider_name};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub app_id: Option<String>,
    pub oa_secret_key: Option<String>,
    pub timestamp_tolerance_seconds: u64,
    pub rate_limit_per_minute: u64,
    pub skip_signature_verification: bool,
    pub strict_storage: bool,
    pub max_body_bytes: usize,
    pub request_timeout_seconds: u64,
    pub store_timeout_ms: u64,
    pub providers: Vec<String>,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub redis_url: Option<String>,
}

impl Default for AppConfig {
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
            store_timeout_ms: 1500,
            providers: vec!["zalo".to_string()],
            database_url: None,
            database_max_connections: 10,
            redis_url: None,
        }
    }
}

impl AppConfig {
    /// Reads the TOML file (`--config`, else `WEBHOOK_CONFIG`, else
    /// `./config.toml`), then applies environment overrides.
    pub async fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path
            .or_else(|| env::var("WEBHOOK_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("./config.toml"));
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path).await?;
            Self::from_toml(&content)?
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.normalize();
        config.validate()?;
        config.warn_on_missing_credentials();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| anyhow!("invalid config file: {}", err))
    }

    pub fn normalize(&mut self) {
        self.app_id = non_blank(self.app_id.take());
        self.oa_secret_key = non_blank(self.oa_secret_key.take());
        self.database_url = non_blank(self.database_url.take());
        self.redis_url = non_blank(self.redis_url.take());
        let mut providers: Vec<String> = std::mem::take(&mut self.providers)
            .into_iter()
            .map(|item| item.trim().to_ascii_lowercase())
            .filter(|item| !item.is_empty())
            .collect();
        providers.sort();
        providers.dedup();
        self.providers = providers;
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.rate_limit_per_minute == 0 {
            return Err(anyhow!("rate_limit_per_minute must be greater than 0"));
        }
        if self.store_timeout_ms == 0 {
            return Err(anyhow!("store_timeout_ms must be greater than 0"));
        }
        if self.providers.is_empty() {
            return Err(anyhow!("providers must not be empty"));
        }
        for provider in &self.providers {
            validate_provider_name(provider)?;
        }
        Ok(())
    }

    pub fn to_webhook_config(&self) -> WebhookConfig {
        WebhookConfig {
            bind_addr: self.bind_addr.clone(),
            app_id: self.app_id.clone(),
            oa_secret_key: self.oa_secret_key.clone(),
            timestamp_tolerance_seconds: self.timestamp_tolerance_seconds,
            rate_limit_per_minute: self.rate_limit_per_minute,
            skip_signature_verification: self.skip_signature_verification,
            strict_storage: self.strict_storage,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            store_timeout: Duration::from_millis(self.store_timeout_ms),
            providers: self.providers.clone(),
        }
    }

    pub fn to_storage_config(&self) -> StorageConfig {
        StorageConfig {
            database_url: self.database_url.clone(),
            database_max_connections: self.database_max_connections,
            redis_url: self.redis_url.clone(),
        }
    }

    fn warn_on_missing_credentials(&self) {
        if self.skip_signature_verification {
            warn!("signature verification is disabled");
            return;
        }
        if self.app_id.is_none() || self.oa_secret_key.is_none() {
            warn!("APP_ID or OA_SECRET_KEY not configured, every signed request will be rejected");
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Applies overrides from `lookup`; unparseable numbers keep the current value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("APP_ID") {
            self.app_id = Some(value);
        }
        if let Some(value) = lookup("OA_SECRET_KEY") {
            self.oa_secret_key = Some(value);
        }
        if let Some(value) = lookup("WEBHOOK_TIMESTAMP_TOLERANCE") {
            self.timestamp_tolerance_seconds =
                value.trim().parse().unwrap_or(self.timestamp_tolerance_seconds);
        }
        if let Some(value) = lookup("RATE_LIMIT_PER_MINUTE") {
            self.rate_limit_per_minute = value.trim().parse().unwrap_or(self.rate_limit_per_minute);
        }
        if let Some(value) = lookup("SKIP_SIGNATURE_VERIFICATION") {
            self.skip_signature_verification = parse_flag(&value);
        }
        if let Some(value) = lookup("STRICT_STORAGE") {
            self.strict_storage = parse_flag(&value);
        }
        if let Some(value) = lookup("MAX_BODY_BYTES") {
            self.max_body_bytes = value.trim().parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds =
                value.trim().parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = lookup("STORE_TIMEOUT_MS") {
            self.store_timeout_ms = value.trim().parse().unwrap_or(self.store_timeout_ms);
        }
        if let Some(value) = lookup("WEBHOOK_PROVIDERS") {
            self.providers = parse_list(&value);
        }
        if let Some(value) = lookup("DATABASE_URL") {
            self.database_url = Some(value);
        }
        if let Some(value) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database_max_connections =
                value.trim().parse().unwrap_or(self.database_max_connections);
        }
        if let Some(value) = lookup("REDIS_URL") {
            self.redis_url = Some(value);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
}
