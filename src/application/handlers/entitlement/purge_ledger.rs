//! PurgeWebhookLedgerHandler - drops ledger records past their retention.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::WebhookLedger;

pub struct PurgeWebhookLedgerHandler {
    ledger: Arc<dyn WebhookLedger>,
    retention_days: u32,
}

impl PurgeWebhookLedgerHandler {
    pub fn new(ledger: Arc<dyn WebhookLedger>, retention_days: u32) -> Self {
        Self {
            ledger,
            retention_days,
        }
    }

    /// Deletes records older than the retention window. Returns the count.
    pub async fn handle(&self) -> Result<u64, DomainError> {
        let cutoff = Timestamp::now().minus_days(i64::from(self.retention_days));
        let deleted = self.ledger.purge_before(cutoff).await?;
        if deleted > 0 {
            tracing::info!(deleted, retention_days = self.retention_days, "Purged webhook ledger");
        }
        Ok(deleted)
    }
}
