use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{AttemptId, DomainError, ErrorCode, QuizId};
use crate::domain::quiz::{QuizAttempt, QuizSummary};
use crate::ports::QuizAttemptStore;

/// In-memory quiz and attempt records.
///
/// Attempts are kept in a `BTreeMap` so paging by id is ordered the same
/// way as the PostgreSQL adapter.
#[derive(Default)]
pub struct InMemoryQuizAttemptStore {
    quizzes: RwLock<BTreeMap<QuizId, QuizSummary>>,
    attempts: RwLock<BTreeMap<AttemptId, QuizAttempt>>,
}

impl InMemoryQuizAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_quiz(&self, quiz: QuizSummary) {
        self.quizzes.write().await.insert(quiz.id.clone(), quiz);
    }

    pub async fn insert_attempt(&self, attempt: QuizAttempt) {
        self.attempts.write().await.insert(attempt.id.clone(), attempt);
    }

    pub async fn attempt(&self, id: &AttemptId) -> Option<QuizAttempt> {
        self.attempts.read().await.get(id).cloned()
    }
}

#[async_trait]
impl QuizAttemptStore for InMemoryQuizAttemptStore {
    async fn find_attempts_missing_subject(
        &self,
        after: Option<&AttemptId>,
        limit: u32,
    ) -> Result<Vec<QuizAttempt>, DomainError> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .filter(|a| after.map_or(true, |cursor| &a.id > cursor))
            .filter(|a| a.needs_subject())
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_quiz(&self, quiz_id: &QuizId) -> Result<Option<QuizSummary>, DomainError> {
        Ok(self.quizzes.read().await.get(quiz_id).cloned())
    }

    async fn set_attempt_subject(
        &self,
        attempt_id: &AttemptId,
        subject: &str,
    ) -> Result<(), DomainError> {
        let mut attempts = self.attempts.write().await;
        let attempt = attempts.get_mut(attempt_id).ok_or_else(|| {
            DomainError::new(ErrorCode::AttemptNotFound, "Attempt not found")
                .with_detail("attempt_id", attempt_id.to_string())
        })?;
        attempt.subject = Some(subject.to_string());
        Ok(())
    }
}
