//! PostgreSQL adapters - Database implementations for store ports.
//!
//! - `PostgresEntitlementStore` - premium columns on `users`
//! - `PostgresWebhookLedger` - `processed_webhook_events`
//! - `PostgresQuizAttemptStore` - `quizzes` and `quiz_attempts`

mod entitlement_store;
mod quiz_attempt_store;
mod webhook_ledger;

pub use entitlement_store::PostgresEntitlementStore;
pub use quiz_attempt_store::PostgresQuizAttemptStore;
pub use webhook_ledger::PostgresWebhookLedger;
