//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod entitlement;
pub mod quiz;

pub use entitlement::{
    CheckPremiumHandler, CheckPremiumQuery, CheckPremiumResult, EventDisposition,
    ProcessWebhookHandler, ProcessedEvent, PurgeWebhookLedgerHandler,
};
pub use quiz::{
    BackfillAttemptSubjectsCommand, BackfillAttemptSubjectsHandler, BackfillReport,
    DEFAULT_PAGE_SIZE,
};
