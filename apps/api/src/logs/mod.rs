//! InteractionLog — durable, append-only audit trail of every plan and chat
//! attempt.
//!
//! Writes never fail the caller: every internal failure (no store configured,
//! store unreachable, insert rejected) is logged operationally and swallowed.
//! Each write first ensures the schema exists (`CREATE ... IF NOT EXISTS`),
//! which keeps fresh deployments migration-free and is safe under concurrent
//! cold starts. Writes are fire-and-forget at the call sites, so a bounded
//! jittered retry costs the caller nothing.

pub mod handlers;

use std::time::Duration;

use sqlx::PgPool;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::{error, warn};

use crate::models::logs::{
    text_len, ChatLogRow, LogStats, LogTotal, NewChatLog, NewPlanLog, PlanLogRow,
};

/// Default read-path bound when the caller does not supply one.
pub const DEFAULT_LIMIT: i64 = 1000;

/// Insert attempts beyond the first.
const WRITE_RETRIES: usize = 2;

const CREATE_PLAN_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS plan_generator_logs (
    id SERIAL PRIMARY KEY,
    timestamp TIMESTAMPTZ NOT NULL DEFAULT now(),
    company_name TEXT,
    job_description TEXT,
    job_description_length INTEGER,
    is_url BOOLEAN,
    plan TEXT,
    plan_length INTEGER,
    job_fit TEXT,
    job_fit_length INTEGER,
    metadata JSONB,
    error TEXT
)
"#;

const CREATE_CHAT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS chatbot_logs (
    id SERIAL PRIMARY KEY,
    timestamp TIMESTAMPTZ NOT NULL DEFAULT now(),
    message TEXT,
    message_length INTEGER,
    conversation_history_length INTEGER,
    response TEXT,
    response_length INTEGER,
    metadata JSONB,
    error TEXT
)
"#;

const CREATE_PLAN_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_plan_logs_timestamp ON plan_generator_logs(timestamp DESC)";
const CREATE_CHAT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_chatbot_logs_timestamp ON chatbot_logs(timestamp DESC)";

const INSERT_PLAN_LOG: &str = r#"
INSERT INTO plan_generator_logs (
    company_name, job_description, job_description_length, is_url,
    plan, plan_length, job_fit, job_fit_length, metadata, error
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

const INSERT_CHAT_LOG: &str = r#"
INSERT INTO chatbot_logs (
    message, message_length, conversation_history_length,
    response, response_length, metadata, error
) VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

/// The audit store. `Clone` is cheap (pool handle); handlers clone it into
/// spawned write tasks.
#[derive(Clone)]
pub struct InteractionLog {
    pool: Option<PgPool>,
}

impl InteractionLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Some(pool) }
    }

    /// A log with no backing store: writes warn and drop, reads are empty.
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Idempotently provisions both tables and their timestamp-descending
    /// indexes. Safe to invoke before every write.
    async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_PLAN_TABLE).execute(pool).await?;
        sqlx::query(CREATE_CHAT_TABLE).execute(pool).await?;
        sqlx::query(CREATE_PLAN_INDEX).execute(pool).await?;
        sqlx::query(CREATE_CHAT_INDEX).execute(pool).await?;
        Ok(())
    }

    /// Appends a plan-generation record. Never fails: exhausted retries are
    /// logged and the record is dropped.
    pub async fn append_plan(&self, entry: NewPlanLog) {
        let Some(pool) = &self.pool else {
            warn!("Interaction log disabled; dropping plan record");
            return;
        };

        let result = Retry::spawn(write_retry_strategy(), || Self::insert_plan(pool, &entry)).await;

        if let Err(e) = result {
            error!("Plan log write dropped after retries: {e}");
        }
    }

    /// Appends a chatbot record. Same contract as [`Self::append_plan`].
    pub async fn append_chat(&self, entry: NewChatLog) {
        let Some(pool) = &self.pool else {
            warn!("Interaction log disabled; dropping chat record");
            return;
        };

        let result = Retry::spawn(write_retry_strategy(), || Self::insert_chat(pool, &entry)).await;

        if let Err(e) = result {
            error!("Chat log write dropped after retries: {e}");
        }
    }

    async fn insert_plan(pool: &PgPool, entry: &NewPlanLog) -> Result<(), sqlx::Error> {
        Self::ensure_schema(pool).await?;

        sqlx::query(INSERT_PLAN_LOG)
            .bind(&entry.company_name)
            .bind(&entry.job_description)
            .bind(text_len(&entry.job_description))
            .bind(entry.is_url)
            .bind(&entry.plan)
            .bind(entry.plan.as_deref().map(text_len).unwrap_or(0))
            .bind(&entry.job_fit)
            .bind(entry.job_fit.as_deref().map(text_len).unwrap_or(0))
            .bind(&entry.metadata)
            .bind(&entry.error)
            .execute(pool)
            .await?;

        Ok(())
    }

    async fn insert_chat(pool: &PgPool, entry: &NewChatLog) -> Result<(), sqlx::Error> {
        Self::ensure_schema(pool).await?;

        sqlx::query(INSERT_CHAT_LOG)
            .bind(&entry.message)
            .bind(text_len(&entry.message))
            .bind(entry.conversation_history_length)
            .bind(&entry.response)
            .bind(entry.response.as_deref().map(text_len).unwrap_or(0))
            .bind(&entry.metadata)
            .bind(&entry.error)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Most recent plan records, timestamp descending. Empty on any failure.
    pub async fn list_plan(&self, limit: i64) -> Vec<PlanLogRow> {
        let Some(pool) = &self.pool else {
            return Vec::new();
        };

        let result = sqlx::query_as::<_, PlanLogRow>(
            "SELECT * FROM plan_generator_logs ORDER BY timestamp DESC LIMIT $1",
        )
        .bind(clamp_limit(limit))
        .fetch_all(pool)
        .await;

        result.unwrap_or_else(|e| {
            error!("Failed to read plan logs: {e}");
            Vec::new()
        })
    }

    /// Most recent chat records, timestamp descending. Empty on any failure.
    pub async fn list_chat(&self, limit: i64) -> Vec<ChatLogRow> {
        let Some(pool) = &self.pool else {
            return Vec::new();
        };

        let result = sqlx::query_as::<_, ChatLogRow>(
            "SELECT * FROM chatbot_logs ORDER BY timestamp DESC LIMIT $1",
        )
        .bind(clamp_limit(limit))
        .fetch_all(pool)
        .await;

        result.unwrap_or_else(|e| {
            error!("Failed to read chat logs: {e}");
            Vec::new()
        })
    }

    /// Total row count per table. Zeroed on any failure.
    pub async fn stats(&self) -> LogStats {
        let Some(pool) = &self.pool else {
            return LogStats::default();
        };

        let plan = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM plan_generator_logs")
            .fetch_one(pool);
        let chat = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM chatbot_logs").fetch_one(pool);

        match tokio::try_join!(plan, chat) {
            Ok(((plan_total,), (chat_total,))) => LogStats {
                plan_generator: LogTotal { total: plan_total },
                chatbot: LogTotal { total: chat_total },
            },
            Err(e) => {
                error!("Failed to read log stats: {e}");
                LogStats::default()
            }
        }
    }
}

/// Backoff for audit inserts: ~100ms, ~1s (jittered), then give up.
fn write_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(10)
        .factor(10)
        .max_delay(Duration::from_secs(2))
        .map(jitter)
        .take(WRITE_RETRIES)
}

fn clamp_limit(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_LIMIT
    } else {
        limit
    }
}
