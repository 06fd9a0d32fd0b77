use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, warn};

use webhook_domain::{ClientKey, CounterError, CounterStore, RATE_LIMIT_WINDOW};

const KEY_PREFIX: &str = "ratelimit:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { count: u64 },
    Blocked { count: u64 },
    /// The counter store could not answer; the request is let through.
    FailedOpen,
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, RateDecision::Blocked { .. })
    }
}

/// Fixed-window request counter per client.
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    limit: u64,
    window: Duration,
    call_timeout: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, limit: u64, call_timeout: Duration) -> Self {
        Self {
            store,
            limit,
            window: RATE_LIMIT_WINDOW,
            call_timeout,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub async fn check_and_increment(&self, client: &ClientKey) -> bool {
        self.check(client).await.is_allowed()
    }

    pub async fn check(&self, client: &ClientKey) -> RateDecision {
        let key = format!("{KEY_PREFIX}{client}");
        let incremented = timeout(self.call_timeout, self.store.increment(&key, self.window))
            .await
            .unwrap_or(Err(CounterError::Timeout));

        let count = match incremented {
            Ok(count) => count,
            Err(CounterError::KeyAbsent) => {
                // Fresh window: seed the counter and let the request through.
                let seeded = timeout(self.call_timeout, self.store.seed(&key, 1, self.window))
                    .await
                    .unwrap_or(Err(CounterError::Timeout));
                if let Err(err) = seeded {
                    warn!(client = %client, error = %err, "failed to seed rate counter");
                }
                1
            }
            Err(err) => {
                error!(client = %client, error = %err, "rate limit counter error, failing open");
                return RateDecision::FailedOpen;
            }
        };

        if count > self.limit {
            RateDecision::Blocked { count }
        } else {
            RateDecision::Allowed { count }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webhook_domain::WebhookConfig;

    use crate::test_support::{harness, test_config, FakeCounterStore, Harness};

    fn limiter(store: Arc<FakeCounterStore>, limit: u64) -> RateLimiter {
        RateLimiter::new(store, limit, Duration::from_millis(200))
    }

    fn client(raw: &str) -> ClientKey {
        ClientKey(raw.to_string())
    }

    #[tokio::test]
    async fn blocks_after_limit_is_exceeded() {
        let store = Arc::new(FakeCounterStore::default());
        let limiter = limiter(store, 3);
        let key = client("198.51.100.1");

        for _ in 0..3 {
            assert!(limiter.check_and_increment(&key).await);
        }
        assert_eq!(limiter.check(&key).await, RateDecision::Blocked { count: 4 });
        assert!(limiter.check_and_increment(&client("198.51.100.2")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets_after_expiry() {
        let store = Arc::new(FakeCounterStore::default());
        let limiter = limiter(store, 1);
        let key = client("198.51.100.1");

        assert!(limiter.check_and_increment(&key).await);
        assert!(!limiter.check_and_increment(&key).await);
        tokio::time::advance(RATE_LIMIT_WINDOW + Duration::from_secs(1)).await;
        assert_eq!(limiter.check(&key).await, RateDecision::Allowed { count: 1 });
    }

    #[tokio::test]
    async fn key_absent_error_counts_as_fresh_window() {
        let store = Arc::new(FakeCounterStore::default());
        store.fail_next_increment(CounterError::KeyAbsent);
        let limiter = limiter(store.clone(), 5);
        let key = client("198.51.100.1");

        assert_eq!(limiter.check(&key).await, RateDecision::Allowed { count: 1 });
        assert_eq!(store.value("ratelimit:198.51.100.1"), Some(1));
    }

    #[tokio::test]
    async fn other_counter_errors_fail_open() {
        let store = Arc::new(FakeCounterStore::default());
        store.fail_next_increment(CounterError::Unavailable(anyhow::anyhow!("connection refused")));
        let limiter = limiter(store, 0);

        assert_eq!(limiter.check(&client("x")).await, RateDecision::FailedOpen);
        assert!(!limiter.check_and_increment(&client("x")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_counter_store_fails_open() {
        let store = Arc::new(FakeCounterStore::default());
        store.delay_increments(Duration::from_secs(5));
        let limiter = limiter(store, 0);

        assert_eq!(limiter.check(&client("x")).await, RateDecision::FailedOpen);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_calls_are_counted_exactly() {
        let store = Arc::new(FakeCounterStore::default());
        let limiter = Arc::new(limiter(store.clone(), 100));
        let key = client("203.0.113.9");

        let tasks = (0..150).map(|_| {
            let limiter = limiter.clone();
            let key = key.clone();
            tokio::spawn(async move { limiter.check(&key).await })
        });
        let decisions: Vec<RateDecision> = futures_util::future::join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.expect("task"))
            .collect();

        let allowed = decisions.iter().filter(|d| d.is_allowed()).count();
        assert_eq!(allowed, 100);

        let mut counts: Vec<u64> = decisions
            .iter()
            .map(|d| match d {
                RateDecision::Allowed { count } | RateDecision::Blocked { count } => *count,
                RateDecision::FailedOpen => 0,
            })
            .collect();
        counts.sort_unstable();
        assert_eq!(counts, (1..=150).collect::<Vec<u64>>());
        assert!(store.has_expiry("ratelimit:203.0.113.9"));
    }

    #[tokio::test]
    async fn app_state_limiter_uses_configured_limit() {
        let Harness { state, counters, .. } = harness(WebhookConfig {
            rate_limit_per_minute: 2,
            ..test_config()
        });
        let key = client("192.0.2.4");

        assert_eq!(state.rate_limiter.limit(), 2);
        assert!(state.rate_limiter.check_and_increment(&key).await);
        assert!(state.rate_limiter.check_and_increment(&key).await);
        assert!(!state.rate_limiter.check_and_increment(&key).await);
        assert_eq!(counters.value("ratelimit:192.0.2.4"), Some(3));
    }
}
