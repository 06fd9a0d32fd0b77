use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{RedisError, Script};
use tracing::info;

use webhook_domain::{CounterError, CounterStore};

// INCR and EXPIRE in one round trip. The expiry is set when the increment
// created the key, or repaired when a previous writer left it without one.
const INCREMENT_SCRIPT: &str = r"
local count = redis.call('INCR', KEYS[1])
if count == 1 or redis.call('TTL', KEYS[1]) == -1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
";

/// Counters shared by every receiver instance.
pub struct RedisCounterStore {
    conn: ConnectionManager,
    increment: Script,
}

impl RedisCounterStore {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        info!("redis counter store connected");
        Ok(Self {
            conn,
            increment: Script::new(INCREMENT_SCRIPT),
        })
    }
}

fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

fn unavailable(err: RedisError) -> CounterError {
    if err.is_timeout() {
        CounterError::Timeout
    } else {
        CounterError::Unavailable(anyhow!(err))
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterError> {
        let mut conn = self.conn.clone();
        let count: i64 = self
            .increment
            .key(key)
            .arg(ttl_seconds(ttl))
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;
        u64::try_from(count)
            .map_err(|_| CounterError::Unavailable(anyhow!("counter '{}' went negative", key)))
    }

    async fn seed(&self, key: &str, value: u64, ttl: Duration) -> Result<(), CounterError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CounterError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_ttl_rounds_up_to_one_second() {
        assert_eq!(ttl_seconds(Duration::from_millis(10)), 1);
        assert_eq!(ttl_seconds(Duration::from_secs(60)), 60);
    }

    async fn live_store() -> RedisCounterStore {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
        RedisCounterStore::connect(&url).await.expect("redis")
    }

    #[tokio::test]
    #[ignore = "needs a running redis"]
    async fn increment_sets_expiry_once() {
        let store = live_store().await;
        let key = format!("ratelimit:test:{}", uuid::Uuid::new_v4());

        assert_eq!(store.increment(&key, Duration::from_secs(60)).await.expect("incr"), 1);
        assert_eq!(store.increment(&key, Duration::from_secs(60)).await.expect("incr"), 2);

        let mut conn = store.conn.clone();
        let ttl: i64 = redis::cmd("TTL").arg(&key).query_async(&mut conn).await.expect("ttl");
        assert!(ttl > 0 && ttl <= 60);
    }

    #[tokio::test]
    #[ignore = "needs a running redis"]
    async fn increment_repairs_missing_expiry() {
        let store = live_store().await;
        let key = format!("ratelimit:test:{}", uuid::Uuid::new_v4());
        let mut conn = store.conn.clone();
        let _: () = redis::cmd("SET").arg(&key).arg(5).query_async(&mut conn).await.expect("set");

        assert_eq!(store.increment(&key, Duration::from_secs(60)).await.expect("incr"), 6);
        let ttl: i64 = redis::cmd("TTL").arg(&key).query_async(&mut conn).await.expect("ttl");
        assert!(ttl > 0);
    }

    #[tokio::test]
    #[ignore = "needs a running redis"]
    async fn concurrent_increments_are_atomic() {
        let store = std::sync::Arc::new(live_store().await);
        let key = format!("ratelimit:test:{}", uuid::Uuid::new_v4());
        let tasks = (0..100).map(|_| {
            let store = store.clone();
            let key = key.clone();
            tokio::spawn(async move { store.increment(&key, Duration::from_secs(60)).await })
        });
        let mut counts: Vec<u64> = futures_util::future::join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.expect("task").expect("incr"))
            .collect();
        counts.sort_unstable();
        assert_eq!(counts, (1..=100).collect::<Vec<u64>>());
    }
}
