//! ProcessWebhookHandler - applies one classified provider event.
//!
//! Steps per event:
//! 1. Skip if the ledger already holds `(provider, event_id)`
//! 2. Classify the event
//! 3. Resolve the subject (direct user id or customer lookup)
//! 4. Grant or revoke in the entitlement store
//! 5. Record the outcome in the ledger
//!
//! Store failures abort before step 5 so the provider's redelivery is
//! processed in full.

use std::sync::Arc;

use crate::domain::entitlement::{
    Classification, ClassifyEvent, IgnoreReason, PaymentProvider, SubjectRef, WebhookError,
};
use crate::domain::foundation::UserId;
use crate::ports::{
    EntitlementStore, SaveResult, WebhookLedger, WebhookLedgerRecord, WebhookOutcome,
};

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDisposition {
    Granted { user_id: UserId },
    Revoked { user_id: UserId },
    Ignored { reason: IgnoreReason },
    /// Already in the ledger; nothing was applied.
    Duplicate,
}

impl EventDisposition {
    pub fn label(&self) -> &'static str {
        match self {
            EventDisposition::Granted { .. } => "granted",
            EventDisposition::Revoked { .. } => "revoked",
            EventDisposition::Ignored { .. } => "ignored",
            EventDisposition::Duplicate => "duplicate",
        }
    }

    fn ledger_entry(&self) -> Option<(WebhookOutcome, String)> {
        match self {
            EventDisposition::Granted { user_id } => {
                Some((WebhookOutcome::Granted, user_id.to_string()))
            }
            EventDisposition::Revoked { user_id } => {
                Some((WebhookOutcome::Revoked, user_id.to_string()))
            }
            EventDisposition::Ignored { reason } => {
                Some((WebhookOutcome::Ignored, reason.to_string()))
            }
            EventDisposition::Duplicate => None,
        }
    }
}

/// Result of processing one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedEvent {
    pub provider: PaymentProvider,
    pub event_id: Option<String>,
    pub event_type: String,
    pub disposition: EventDisposition,
}

/// Handler shared by every provider endpoint.
pub struct ProcessWebhookHandler {
    store: Arc<dyn EntitlementStore>,
    ledger: Option<Arc<dyn WebhookLedger>>,
}

impl ProcessWebhookHandler {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self {
            store,
            ledger: None,
        }
    }

    /// Enables duplicate detection through the given ledger.
    pub fn with_ledger(mut self, ledger: Arc<dyn WebhookLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub async fn handle(&self, event: &dyn ClassifyEvent) -> Result<ProcessedEvent, WebhookError> {
        let provider = event.provider();
        let event_id = event.event_id().map(str::to_string);
        let event_type = event.event_type().to_string();

        let done = |disposition| ProcessedEvent {
            provider,
            event_id: event_id.clone(),
            event_type: event_type.clone(),
            disposition,
        };

        if let (Some(ledger), Some(id)) = (&self.ledger, event_id.as_deref()) {
            if ledger.find(provider, id).await?.is_some() {
                tracing::info!(
                    provider = %provider,
                    event_id = id,
                    event_type = %event_type,
                    "Skipping duplicate webhook delivery"
                );
                return Ok(done(EventDisposition::Duplicate));
            }
        }

        let disposition = self.apply(provider, event.classify()).await.map_err(|e| {
            tracing::error!(
                provider = %provider,
                event_id = event_id.as_deref().unwrap_or("-"),
                event_type = %event_type,
                error = %e,
                "Entitlement write failed"
            );
            e
        })?;

        log_disposition(provider, event_id.as_deref(), &event_type, &disposition);

        if let (Some(ledger), Some(id)) = (&self.ledger, event_id.as_deref()) {
            self.record(ledger.as_ref(), provider, id, &event_type, &disposition)
                .await;
        }

        Ok(done(disposition))
    }

    async fn apply(
        &self,
        provider: PaymentProvider,
        classification: Classification,
    ) -> Result<EventDisposition, WebhookError> {
        match classification {
            Classification::Grant { subject, grant } => {
                let Some(user_id) = self.resolve(provider, &subject).await? else {
                    return Ok(unresolved(subject));
                };
                self.store.grant(&user_id, &grant).await?;
                Ok(EventDisposition::Granted { user_id })
            }
            Classification::Revoke {
                subject,
                revocation,
            } => {
                let Some(user_id) = self.resolve(provider, &subject).await? else {
                    return Ok(unresolved(subject));
                };
                self.store.revoke(&user_id, &revocation).await?;
                Ok(EventDisposition::Revoked { user_id })
            }
            Classification::Ignore { reason } => Ok(EventDisposition::Ignored { reason }),
        }
    }

    async fn resolve(
        &self,
        provider: PaymentProvider,
        subject: &SubjectRef,
    ) -> Result<Option<UserId>, WebhookError> {
        match subject {
            SubjectRef::User(user_id) => Ok(Some(user_id.clone())),
            SubjectRef::Customer(customer_id) => Ok(self
                .store
                .find_user_by_customer_id(provider, customer_id)
                .await?),
        }
    }

    /// Ledger write failures are logged only: the mutation already happened and
    /// replaying it is harmless.
    async fn record(
        &self,
        ledger: &dyn WebhookLedger,
        provider: PaymentProvider,
        event_id: &str,
        event_type: &str,
        disposition: &EventDisposition,
    ) {
        let Some((outcome, detail)) = disposition.ledger_entry() else {
            return;
        };
        let record =
            WebhookLedgerRecord::new(provider, event_id, event_type, outcome).with_detail(detail);

        match ledger.record(record).await {
            Ok(SaveResult::Inserted) => {}
            Ok(SaveResult::AlreadyExists) => {
                tracing::debug!(
                    provider = %provider,
                    event_id,
                    "Concurrent delivery recorded the event first"
                );
            }
            Err(e) => {
                tracing::warn!(
                    provider = %provider,
                    event_id,
                    error = %e,
                    "Failed to record webhook in ledger"
                );
            }
        }
    }
}

fn unresolved(subject: SubjectRef) -> EventDisposition {
    let reason = match subject {
        SubjectRef::Customer(customer_id) => IgnoreReason::UnknownCustomer(customer_id),
        SubjectRef::User(_) => IgnoreReason::MissingSubject,
    };
    EventDisposition::Ignored { reason }
}

fn log_disposition(
    provider: PaymentProvider,
    event_id: Option<&str>,
    event_type: &str,
    disposition: &EventDisposition,
) {
    let event_id = event_id.unwrap_or("-");
    match disposition {
        EventDisposition::Granted { user_id } => tracing::info!(
            provider = %provider,
            event_id,
            event_type,
            user_id = %user_id,
            "Premium granted"
        ),
        EventDisposition::Revoked { user_id } => tracing::info!(
            provider = %provider,
            event_id,
            event_type,
            user_id = %user_id,
            "Premium revoked"
        ),
        EventDisposition::Ignored {
            reason: IgnoreReason::UnhandledEventType(_),
        } => tracing::debug!(provider = %provider, event_id, event_type, "Event type not handled"),
        EventDisposition::Ignored { reason } => tracing::warn!(
            provider = %provider,
            event_id,
            event_type,
            reason = %reason,
            "Webhook acknowledged without entitlement change"
        ),
        EventDisposition::Duplicate => {}
    }
}
