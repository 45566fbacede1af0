//! In-memory adapters for tests and local development.
//!
//! State lives behind `tokio::sync::RwLock` and is lost on restart.

mod entitlement_store;
mod quiz_attempt_store;
mod webhook_ledger;

pub use entitlement_store::InMemoryEntitlementStore;
pub use quiz_attempt_store::InMemoryQuizAttemptStore;
pub use webhook_ledger::InMemoryWebhookLedger;
