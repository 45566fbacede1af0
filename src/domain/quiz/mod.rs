//! Quiz and quiz attempt records.
//!
//! Only the `subject` field is modelled; the rest of a quiz lives in the
//! document store and is never read here.

mod attempt;

pub use attempt::{BackfillDecision, QuizAttempt, QuizSummary};
