use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;

use webhook_domain::{EventStatus, EventStore, NewEvent, StoreError, StoredEvent};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS webhook_events (
        id BIGSERIAL PRIMARY KEY,
        event_name VARCHAR(100) NOT NULL,
        msg_id VARCHAR(255),
        app_id VARCHAR(100) NOT NULL,
        oa_id VARCHAR(100),
        user_id VARCHAR(100),
        payload JSONB NOT NULL,
        timestamp BIGINT NOT NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'received',
        signature_verified BOOLEAN NOT NULL DEFAULT FALSE,
        client_ip TEXT,
        received_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        processed_at TIMESTAMPTZ,
        error_message TEXT NOT NULL DEFAULT '',
        retry_count SMALLINT NOT NULL DEFAULT 0
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS webhook_events_msg_id_key ON webhook_events (msg_id)",
    "CREATE INDEX IF NOT EXISTS webhook_events_event_name_idx ON webhook_events (event_name, received_at)",
    "CREATE INDEX IF NOT EXISTS webhook_events_status_idx ON webhook_events (status, received_at)",
    "CREATE INDEX IF NOT EXISTS webhook_events_user_id_idx ON webhook_events (user_id)",
];

const SELECT_COLUMNS: &str = "id, event_name, msg_id, app_id, oa_id, user_id, payload, timestamp, \
     status, signature_verified, client_ip, received_at, processed_at, error_message, retry_count";

/// Durable event table. Uniqueness of `msg_id` is enforced by the database.
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        info!(max_connections, "postgres event store connected");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn map_error(err: sqlx::Error, msg_id: Option<&str>) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::DuplicateKey {
            msg_id: msg_id.unwrap_or_default().to_string(),
        },
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        other => StoreError::Unavailable(anyhow!(other)),
    }
}

fn row_to_event(row: &PgRow) -> Result<StoredEvent, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(StoredEvent {
        id: row.try_get("id")?,
        event_name: row.try_get("event_name")?,
        msg_id: row.try_get("msg_id")?,
        app_id: row.try_get("app_id")?,
        oa_id: row.try_get("oa_id")?,
        user_id: row.try_get("user_id")?,
        payload: row.try_get::<Value, _>("payload")?,
        timestamp: row.try_get("timestamp")?,
        status: EventStatus::from(status.as_str()),
        signature_verified: row.try_get("signature_verified")?,
        client_ip: row.try_get("client_ip")?,
        received_at: row.try_get("received_at")?,
        processed_at: row.try_get("processed_at")?,
        error_message: row.try_get("error_message")?,
        retry_count: row.try_get("retry_count")?,
    })
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn insert(&self, event: NewEvent) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO webhook_events
                (event_name, msg_id, app_id, oa_id, user_id, payload, timestamp,
                 status, signature_verified, client_ip)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&event.event_name)
        .bind(&event.msg_id)
        .bind(&event.app_id)
        .bind(&event.oa_id)
        .bind(&event.user_id)
        .bind(&event.payload)
        .bind(event.timestamp)
        .bind(EventStatus::Received.as_str())
        .bind(event.signature_verified)
        .bind(&event.client_ip)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_error(err, event.msg_id.as_deref()))
    }

    async fn get(&self, id: i64) -> Result<Option<StoredEvent>, StoreError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM webhook_events WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| map_error(err, None))?;
        row.as_ref()
            .map(row_to_event)
            .transpose()
            .map_err(|err| map_error(err, None))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM webhook_events")
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_error(err, None))?;
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|err| map_error(err, None))
    }
}
