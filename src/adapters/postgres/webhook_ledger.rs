//! PostgreSQL implementation of WebhookLedger.
//!
//! The `(provider, event_id)` primary key makes concurrent inserts safe:
//! the loser gets zero affected rows and reports `AlreadyExists`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entitlement::PaymentProvider;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{SaveResult, WebhookLedger, WebhookLedgerRecord, WebhookOutcome};

pub struct PostgresWebhookLedger {
    pool: PgPool,
}

impl PostgresWebhookLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LedgerRow {
    provider: String,
    event_id: String,
    event_type: String,
    outcome: String,
    detail: Option<String>,
    processed_at: DateTime<Utc>,
}

impl TryFrom<LedgerRow> for WebhookLedgerRecord {
    type Error = DomainError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        Ok(WebhookLedgerRecord {
            provider: row.provider.parse().map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid provider: {}", e))
            })?,
            event_id: row.event_id,
            event_type: row.event_type,
            outcome: WebhookOutcome::from_stored(&row.outcome),
            detail: row.detail,
            processed_at: Timestamp::from_datetime(row.processed_at),
        })
    }
}

#[async_trait]
impl WebhookLedger for PostgresWebhookLedger {
    async fn find(
        &self,
        provider: PaymentProvider,
        event_id: &str,
    ) -> Result<Option<WebhookLedgerRecord>, DomainError> {
        let row: Option<LedgerRow> = sqlx::query_as(
            r#"
            SELECT provider, event_id, event_type, outcome, detail, processed_at
            FROM processed_webhook_events
            WHERE provider = $1 AND event_id = $2
            "#,
        )
        .bind(provider.as_str())
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find webhook event: {}", e)))?;

        row.map(WebhookLedgerRecord::try_from).transpose()
    }

    async fn record(&self, record: WebhookLedgerRecord) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO processed_webhook_events (
                provider, event_id, event_type, outcome, detail, processed_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (provider, event_id) DO NOTHING
            "#,
        )
        .bind(record.provider.as_str())
        .bind(&record.event_id)
        .bind(&record.event_type)
        .bind(record.outcome.as_str())
        .bind(&record.detail)
        .bind(record.processed_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to record webhook event: {}", e)))?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }

    async fn purge_before(&self, cutoff: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM processed_webhook_events WHERE processed_at < $1")
            .bind(cutoff.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to purge webhook events: {}", e)))?;

        Ok(result.rows_affected())
    }
}
