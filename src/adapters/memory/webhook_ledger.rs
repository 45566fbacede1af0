use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entitlement::PaymentProvider;
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{SaveResult, WebhookLedger, WebhookLedgerRecord};

/// In-memory implementation of the WebhookLedger port.
#[derive(Default)]
pub struct InMemoryWebhookLedger {
    records: RwLock<HashMap<(PaymentProvider, String), WebhookLedgerRecord>>,
}

impl InMemoryWebhookLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl WebhookLedger for InMemoryWebhookLedger {
    async fn find(
        &self,
        provider: PaymentProvider,
        event_id: &str,
    ) -> Result<Option<WebhookLedgerRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(&(provider, event_id.to_string())).cloned())
    }

    async fn record(&self, record: WebhookLedgerRecord) -> Result<SaveResult, DomainError> {
        let mut records = self.records.write().await;
        let key = (record.provider, record.event_id.clone());
        if records.contains_key(&key) {
            Ok(SaveResult::AlreadyExists)
        } else {
            records.insert(key, record);
            Ok(SaveResult::Inserted)
        }
    }

    async fn purge_before(&self, cutoff: Timestamp) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let before_count = records.len();
        records.retain(|_, r| !r.processed_at.is_before(&cutoff));
        Ok((before_count - records.len()) as u64)
    }
}
