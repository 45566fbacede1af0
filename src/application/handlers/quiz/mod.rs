//! Quiz data repair handlers.

mod backfill_attempt_subjects;

pub use backfill_attempt_subjects::{
    BackfillAttemptSubjectsCommand, BackfillAttemptSubjectsHandler, BackfillReport,
    DEFAULT_PAGE_SIZE,
};
