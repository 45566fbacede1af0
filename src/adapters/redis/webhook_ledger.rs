//! Redis-backed webhook ledger for multi-server deployments.
//!
//! Each processed event is one key written with `SET NX EX`, so the insert is
//! atomic and records expire on their own after the configured TTL.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::domain::entitlement::PaymentProvider;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{SaveResult, WebhookLedger, WebhookLedgerRecord, WebhookOutcome};

const KEY_PREFIX: &str = "quizgod:webhook";

#[derive(Clone)]
pub struct RedisWebhookLedger {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisWebhookLedger {
    pub fn new(conn: MultiplexedConnection, ttl_secs: u64) -> Self {
        Self { conn, ttl_secs }
    }
}

/// Stored value for one ledger key.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    event_type: String,
    outcome: String,
    detail: Option<String>,
    processed_at: i64,
}

impl StoredRecord {
    fn from_record(record: &WebhookLedgerRecord) -> Self {
        Self {
            event_type: record.event_type.clone(),
            outcome: record.outcome.as_str().to_string(),
            detail: record.detail.clone(),
            processed_at: record.processed_at.as_unix_secs(),
        }
    }

    fn into_record(self, provider: PaymentProvider, event_id: &str) -> WebhookLedgerRecord {
        WebhookLedgerRecord {
            provider,
            event_id: event_id.to_string(),
            event_type: self.event_type,
            outcome: WebhookOutcome::from_stored(&self.outcome),
            detail: self.detail,
            processed_at: Timestamp::from_unix_secs(self.processed_at).unwrap_or_default(),
        }
    }
}

fn ledger_key(provider: PaymentProvider, event_id: &str) -> String {
    format!("{}:{}:{}", KEY_PREFIX, provider.as_str(), event_id)
}

fn cache_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::CacheError, format!("Redis ledger error: {}", e))
}

#[async_trait]
impl WebhookLedger for RedisWebhookLedger {
    async fn find(
        &self,
        provider: PaymentProvider,
        event_id: &str,
    ) -> Result<Option<WebhookLedgerRecord>, DomainError> {
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn
            .get(ledger_key(provider, event_id))
            .await
            .map_err(|e: redis::RedisError| cache_error(e))?;

        raw.map(|json| {
            serde_json::from_str::<StoredRecord>(&json)
                .map(|stored| stored.into_record(provider, event_id))
                .map_err(cache_error)
        })
        .transpose()
    }

    async fn record(&self, record: WebhookLedgerRecord) -> Result<SaveResult, DomainError> {
        let mut conn = self.conn.clone();
        let value = serde_json::to_string(&StoredRecord::from_record(&record)).map_err(cache_error)?;

        let reply: Option<String> = redis::cmd("SET")
            .arg(ledger_key(record.provider, &record.event_id))
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| cache_error(e))?;

        // SET NX replies nil when the key already exists
        Ok(match reply {
            Some(_) => SaveResult::Inserted,
            None => SaveResult::AlreadyExists,
        })
    }

    async fn purge_before(&self, _cutoff: Timestamp) -> Result<u64, DomainError> {
        // Keys expire through their TTL.
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_per_provider() {
        assert_eq!(
            ledger_key(PaymentProvider::Paddle, "evt_01"),
            "quizgod:webhook:paddle:evt_01"
        );
        assert_ne!(
            ledger_key(PaymentProvider::Stripe, "x"),
            ledger_key(PaymentProvider::FastSpring, "x")
        );
    }

    #[test]
    fn stored_record_restores_ledger_record() {
        let record = WebhookLedgerRecord::new(
            PaymentProvider::FastSpring,
            "fs_1",
            "subscription.canceled",
            WebhookOutcome::Revoked,
        )
        .with_detail("u2");

        let json = serde_json::to_string(&StoredRecord::from_record(&record)).unwrap();
        let restored = serde_json::from_str::<StoredRecord>(&json)
            .unwrap()
            .into_record(PaymentProvider::FastSpring, "fs_1");

        assert_eq!(restored.outcome, WebhookOutcome::Revoked);
        assert_eq!(restored.detail.as_deref(), Some("u2"));
        assert_eq!(
            restored.processed_at.as_unix_secs(),
            record.processed_at.as_unix_secs()
        );
    }
}
