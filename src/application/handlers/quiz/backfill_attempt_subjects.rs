//! BackfillAttemptSubjectsHandler - copies each quiz's subject onto its attempts.
//!
//! Pages through attempts lacking a subject in id order. A failure on one
//! attempt is logged and counted and the scan continues; a failure fetching a
//! page aborts the run.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{AttemptId, DomainError};
use crate::domain::quiz::{BackfillDecision, QuizAttempt};
use crate::ports::QuizAttemptStore;

/// Default number of attempts fetched per page.
pub const DEFAULT_PAGE_SIZE: u32 = 200;

#[derive(Debug, Clone)]
pub struct BackfillAttemptSubjectsCommand {
    pub page_size: u32,
    /// Count what would change without writing.
    pub dry_run: bool,
}

impl Default for BackfillAttemptSubjectsCommand {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            dry_run: false,
        }
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub scanned: u64,
    /// Attempts written (or that would be written, in a dry run).
    pub updated: u64,
    pub skipped_quiz_missing: u64,
    pub skipped_no_subject: u64,
    pub failed: u64,
    pub dry_run: bool,
}

pub struct BackfillAttemptSubjectsHandler {
    store: Arc<dyn QuizAttemptStore>,
}

impl BackfillAttemptSubjectsHandler {
    pub fn new(store: Arc<dyn QuizAttemptStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        cmd: BackfillAttemptSubjectsCommand,
    ) -> Result<BackfillReport, DomainError> {
        if cmd.page_size == 0 {
            return Err(DomainError::validation("page_size", "Page size must be positive"));
        }

        let mut report = BackfillReport {
            dry_run: cmd.dry_run,
            ..BackfillReport::default()
        };
        let mut cursor: Option<AttemptId> = None;

        loop {
            let page = self
                .store
                .find_attempts_missing_subject(cursor.as_ref(), cmd.page_size)
                .await?;
            let page_len = page.len();

            for attempt in page {
                report.scanned += 1;
                if let Err(e) = self.process(&attempt, cmd.dry_run, &mut report).await {
                    report.failed += 1;
                    tracing::error!(
                        attempt_id = %attempt.id,
                        quiz_id = %attempt.quiz_id,
                        error = %e,
                        "Failed to backfill attempt subject"
                    );
                }
                cursor = Some(attempt.id);
            }

            tracing::debug!(page_len, scanned = report.scanned, "Backfill page done");
            if page_len < cmd.page_size as usize {
                break;
            }
        }

        tracing::info!(
            scanned = report.scanned,
            updated = report.updated,
            skipped_quiz_missing = report.skipped_quiz_missing,
            skipped_no_subject = report.skipped_no_subject,
            failed = report.failed,
            dry_run = report.dry_run,
            "Attempt subject backfill finished"
        );

        Ok(report)
    }

    async fn process(
        &self,
        attempt: &QuizAttempt,
        dry_run: bool,
        report: &mut BackfillReport,
    ) -> Result<(), DomainError> {
        let quiz = self.store.find_quiz(&attempt.quiz_id).await?;

        match BackfillDecision::decide(attempt, quiz.as_ref()) {
            BackfillDecision::Update(subject) => {
                if !dry_run {
                    self.store.set_attempt_subject(&attempt.id, &subject).await?;
                }
                report.updated += 1;
            }
            BackfillDecision::QuizMissing => {
                tracing::warn!(
                    attempt_id = %attempt.id,
                    quiz_id = %attempt.quiz_id,
                    "Quiz not found for attempt"
                );
                report.skipped_quiz_missing += 1;
            }
            BackfillDecision::QuizWithoutSubject => report.skipped_no_subject += 1,
            BackfillDecision::AlreadySet => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryQuizAttemptStore;
    use crate::domain::foundation::{ErrorCode, QuizId};
    use crate::domain::quiz::QuizSummary;
    use async_trait::async_trait;

    fn attempt(id: &str, quiz_id: &str) -> QuizAttempt {
        QuizAttempt {
            id: AttemptId::new(id).unwrap(),
            quiz_id: QuizId::new(quiz_id).unwrap(),
            subject: None,
        }
    }

    fn quiz(id: &str, subject: Option<&str>) -> QuizSummary {
        QuizSummary {
            id: QuizId::new(id).unwrap(),
            subject: subject.map(String::from),
        }
    }

    async fn seeded_store() -> Arc<InMemoryQuizAttemptStore> {
        let store = Arc::new(InMemoryQuizAttemptStore::new());
        store.insert_quiz(quiz("q-bio", Some("Biology"))).await;
        store.insert_quiz(quiz("q-blank", None)).await;
        store.insert_attempt(attempt("a1", "q-bio")).await;
        store.insert_attempt(attempt("a2", "q-bio")).await;
        store.insert_attempt(attempt("a3", "q-deleted")).await;
        store.insert_attempt(attempt("a4", "q-blank")).await;
        store
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn copies_subjects_and_counts_skips() {
        let store = seeded_store().await;
        let handler = BackfillAttemptSubjectsHandler::new(store.clone());

        let report = handler
            .handle(BackfillAttemptSubjectsCommand {
                page_size: 2,
                dry_run: false,
            })
            .await
            .unwrap();

        assert_eq!(report.scanned, 4);
        assert_eq!(report.updated, 2);
        assert_eq!(report.skipped_quiz_missing, 1);
        assert_eq!(report.skipped_no_subject, 1);
        assert_eq!(report.failed, 0);

        let a1 = store.attempt(&AttemptId::new("a1").unwrap()).await.unwrap();
        assert_eq!(a1.subject.as_deref(), Some("Biology"));
        let a3 = store.attempt(&AttemptId::new("a3").unwrap()).await.unwrap();
        assert!(a3.subject.is_none());
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let store = seeded_store().await;
        let handler = BackfillAttemptSubjectsHandler::new(store.clone());

        let report = handler
            .handle(BackfillAttemptSubjectsCommand {
                page_size: 10,
                dry_run: true,
            })
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.updated, 2);
        let a1 = store.attempt(&AttemptId::new("a1").unwrap()).await.unwrap();
        assert!(a1.subject.is_none());
    }

    #[tokio::test]
    async fn second_run_finds_nothing_to_update() {
        let store = seeded_store().await;
        let handler = BackfillAttemptSubjectsHandler::new(store);

        handler.handle(BackfillAttemptSubjectsCommand::default()).await.unwrap();
        let report = handler
            .handle(BackfillAttemptSubjectsCommand::default())
            .await
            .unwrap();

        assert_eq!(report.updated, 0);
        assert_eq!(report.scanned, 2);
    }

    #[tokio::test]
    async fn zero_page_size_is_rejected() {
        let handler = BackfillAttemptSubjectsHandler::new(Arc::new(InMemoryQuizAttemptStore::new()));

        let err = handler
            .handle(BackfillAttemptSubjectsCommand {
                page_size: 0,
                dry_run: false,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    /// Store whose writes always fail.
    struct FailingWrites {
        inner: InMemoryQuizAttemptStore,
    }

    #[async_trait]
    impl QuizAttemptStore for FailingWrites {
        async fn find_attempts_missing_subject(
            &self,
            after: Option<&AttemptId>,
            limit: u32,
        ) -> Result<Vec<QuizAttempt>, DomainError> {
            self.inner.find_attempts_missing_subject(after, limit).await
        }

        async fn find_quiz(&self, quiz_id: &QuizId) -> Result<Option<QuizSummary>, DomainError> {
            self.inner.find_quiz(quiz_id).await
        }

        async fn set_attempt_subject(&self, _: &AttemptId, _: &str) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "Simulated write failure"))
        }
    }

    #[tokio::test]
    async fn per_record_failures_are_counted_and_scan_continues() {
        let inner = InMemoryQuizAttemptStore::new();
        inner.insert_quiz(quiz("q-bio", Some("Biology"))).await;
        inner.insert_attempt(attempt("a1", "q-bio")).await;
        inner.insert_attempt(attempt("a2", "q-missing")).await;
        let handler = BackfillAttemptSubjectsHandler::new(Arc::new(FailingWrites { inner }));

        let report = handler
            .handle(BackfillAttemptSubjectsCommand::default())
            .await
            .unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.updated, 0);
        assert_eq!(report.skipped_quiz_missing, 1);
    }
}
