//! WebhookLedger port - Tracks provider events that were already applied.
//!
//! Providers redeliver on timeouts and 5xx responses. Only successfully
//! handled events are recorded, so a failed delivery is retried in full.

use async_trait::async_trait;
use std::fmt;

use crate::domain::entitlement::PaymentProvider;
use crate::domain::foundation::{DomainError, Timestamp};

/// What processing an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Granted,
    Revoked,
    Ignored,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Granted => "granted",
            WebhookOutcome::Revoked => "revoked",
            WebhookOutcome::Ignored => "ignored",
        }
    }

    /// Parses a stored outcome, treating unknown values as `Ignored`.
    pub fn from_stored(value: &str) -> Self {
        match value {
            "granted" => WebhookOutcome::Granted,
            "revoked" => WebhookOutcome::Revoked,
            _ => WebhookOutcome::Ignored,
        }
    }
}

impl fmt::Display for WebhookOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of a processed webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookLedgerRecord {
    pub provider: PaymentProvider,
    /// Provider event id (`evt_...` for Stripe).
    pub event_id: String,
    pub event_type: String,
    pub outcome: WebhookOutcome,
    /// Ignore reason or affected user, for auditing.
    pub detail: Option<String>,
    pub processed_at: Timestamp,
}

impl WebhookLedgerRecord {
    pub fn new(
        provider: PaymentProvider,
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        outcome: WebhookOutcome,
    ) -> Self {
        Self {
            provider,
            event_id: event_id.into(),
            event_type: event_type.into(),
            outcome,
            detail: None,
            processed_at: Timestamp::now(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Result of attempting to record a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// First time seeing this event.
    Inserted,
    /// Another delivery already recorded it.
    AlreadyExists,
}

/// Port for the processed-event ledger.
///
/// Implementations key records on `(provider, event_id)` and must make
/// `record` atomic so concurrent deliveries cannot both insert.
#[async_trait]
pub trait WebhookLedger: Send + Sync {
    /// Find a previously processed event. `None` if not yet seen.
    async fn find(
        &self,
        provider: PaymentProvider,
        event_id: &str,
    ) -> Result<Option<WebhookLedgerRecord>, DomainError>;

    /// Record a processed event with insert-if-absent semantics.
    async fn record(&self, record: WebhookLedgerRecord) -> Result<SaveResult, DomainError>;

    /// Delete records processed before `cutoff`. Returns the number deleted.
    async fn purge_before(&self, cutoff: Timestamp) -> Result<u64, DomainError>;
}
