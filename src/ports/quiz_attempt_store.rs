//! Quiz attempt store port, used by the subject backfill.

use async_trait::async_trait;

use crate::domain::foundation::{AttemptId, DomainError, QuizId};
use crate::domain::quiz::{QuizAttempt, QuizSummary};

/// Read/write surface over quiz and attempt records.
#[async_trait]
pub trait QuizAttemptStore: Send + Sync {
    /// Attempts with no subject, ordered by id, strictly after `after`.
    async fn find_attempts_missing_subject(
        &self,
        after: Option<&AttemptId>,
        limit: u32,
    ) -> Result<Vec<QuizAttempt>, DomainError>;

    /// Load a quiz. `None` if it was deleted.
    async fn find_quiz(&self, quiz_id: &QuizId) -> Result<Option<QuizSummary>, DomainError>;

    /// Set the subject on one attempt.
    async fn set_attempt_subject(
        &self,
        attempt_id: &AttemptId,
        subject: &str,
    ) -> Result<(), DomainError>;
}
