//! PostgreSQL implementation of QuizAttemptStore.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{AttemptId, DomainError, ErrorCode, QuizId};
use crate::domain::quiz::{QuizAttempt, QuizSummary};
use crate::ports::QuizAttemptStore;

pub struct PostgresQuizAttemptStore {
    pool: PgPool,
}

impl PostgresQuizAttemptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AttemptRow {
    id: String,
    quiz_id: String,
    subject: Option<String>,
}

impl TryFrom<AttemptRow> for QuizAttempt {
    type Error = DomainError;

    fn try_from(row: AttemptRow) -> Result<Self, Self::Error> {
        Ok(QuizAttempt {
            id: AttemptId::new(row.id)?,
            quiz_id: QuizId::new(row.quiz_id)?,
            subject: row.subject,
        })
    }
}

#[async_trait]
impl QuizAttemptStore for PostgresQuizAttemptStore {
    async fn find_attempts_missing_subject(
        &self,
        after: Option<&AttemptId>,
        limit: u32,
    ) -> Result<Vec<QuizAttempt>, DomainError> {
        let rows: Vec<AttemptRow> = sqlx::query_as(
            r#"
            SELECT id, quiz_id, subject
            FROM quiz_attempts
            WHERE (subject IS NULL OR btrim(subject) = '')
              AND ($1::TEXT IS NULL OR id > $1)
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(after.map(AttemptId::as_str))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list attempts: {}", e)))?;

        rows.into_iter().map(QuizAttempt::try_from).collect()
    }

    async fn find_quiz(&self, quiz_id: &QuizId) -> Result<Option<QuizSummary>, DomainError> {
        let subject: Option<Option<String>> =
            sqlx::query_scalar("SELECT subject FROM quizzes WHERE id = $1")
                .bind(quiz_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to find quiz: {}", e)))?;

        Ok(subject.map(|subject| QuizSummary {
            id: quiz_id.clone(),
            subject,
        }))
    }

    async fn set_attempt_subject(
        &self,
        attempt_id: &AttemptId,
        subject: &str,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE quiz_attempts SET subject = $2 WHERE id = $1")
            .bind(attempt_id.as_str())
            .bind(subject)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to update attempt: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::AttemptNotFound, "Attempt not found")
                .with_detail("attempt_id", attempt_id.to_string()));
        }

        Ok(())
    }
}
