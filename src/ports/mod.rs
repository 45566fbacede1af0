//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `EntitlementStore` - premium fields on user records
//! - `WebhookLedger` - processed-event tracking for duplicate deliveries
//! - `QuizAttemptStore` - quiz/attempt records for the subject backfill

mod entitlement_store;
mod quiz_attempt_store;
mod webhook_ledger;

pub use entitlement_store::EntitlementStore;
pub use quiz_attempt_store::QuizAttemptStore;
pub use webhook_ledger::{SaveResult, WebhookLedger, WebhookLedgerRecord, WebhookOutcome};
