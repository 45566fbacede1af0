//! Redis adapters.

mod webhook_ledger;

pub use webhook_ledger::RedisWebhookLedger;
