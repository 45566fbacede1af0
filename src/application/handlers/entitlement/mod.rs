//! Entitlement command and query handlers.

mod check_premium;
mod process_webhook;
mod purge_ledger;

pub use check_premium::{CheckPremiumHandler, CheckPremiumQuery, CheckPremiumResult};
pub use process_webhook::{EventDisposition, ProcessWebhookHandler, ProcessedEvent};
pub use purge_ledger::PurgeWebhookLedgerHandler;
