use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AttemptId, QuizId};

/// The part of a quiz record the backfill needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: QuizId,
    pub subject: Option<String>,
}

impl QuizSummary {
    /// Subject with surrounding whitespace removed, `None` when blank.
    pub fn usable_subject(&self) -> Option<&str> {
        self.subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A stored attempt at a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: AttemptId,
    pub quiz_id: QuizId,
    pub subject: Option<String>,
}

impl QuizAttempt {
    pub fn needs_subject(&self) -> bool {
        self.subject.as_deref().map_or(true, |s| s.trim().is_empty())
    }
}

/// What the backfill should do with one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackfillDecision {
    /// Copy this subject onto the attempt.
    Update(String),
    /// The attempt already has a subject.
    AlreadySet,
    /// The referenced quiz does not exist.
    QuizMissing,
    /// The quiz exists but has no subject either.
    QuizWithoutSubject,
}

impl BackfillDecision {
    pub fn decide(attempt: &QuizAttempt, quiz: Option<&QuizSummary>) -> Self {
        if !attempt.needs_subject() {
            return BackfillDecision::AlreadySet;
        }
        match quiz {
            None => BackfillDecision::QuizMissing,
            Some(quiz) => match quiz.usable_subject() {
                Some(subject) => BackfillDecision::Update(subject.to_string()),
                None => BackfillDecision::QuizWithoutSubject,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(subject: Option<&str>) -> QuizAttempt {
        QuizAttempt {
            id: AttemptId::new("a1").unwrap(),
            quiz_id: QuizId::new("q1").unwrap(),
            subject: subject.map(String::from),
        }
    }

    fn quiz(subject: Option<&str>) -> QuizSummary {
        QuizSummary {
            id: QuizId::new("q1").unwrap(),
            subject: subject.map(String::from),
        }
    }

    #[test]
    fn copies_quiz_subject_onto_attempt() {
        assert_eq!(
            BackfillDecision::decide(&attempt(None), Some(&quiz(Some("Biology")))),
            BackfillDecision::Update("Biology".to_string())
        );
    }

    #[test]
    fn blank_attempt_subject_counts_as_missing() {
        assert_eq!(
            BackfillDecision::decide(&attempt(Some("  ")), Some(&quiz(Some(" History ")))),
            BackfillDecision::Update("History".to_string())
        );
    }

    #[test]
    fn attempt_with_subject_is_left_alone() {
        assert_eq!(
            BackfillDecision::decide(&attempt(Some("Math")), Some(&quiz(Some("Biology")))),
            BackfillDecision::AlreadySet
        );
    }

    #[test]
    fn missing_quiz_is_skipped() {
        assert_eq!(
            BackfillDecision::decide(&attempt(None), None),
            BackfillDecision::QuizMissing
        );
    }

    #[test]
    fn quiz_without_subject_is_skipped() {
        assert_eq!(
            BackfillDecision::decide(&attempt(None), Some(&quiz(Some("")))),
            BackfillDecision::QuizWithoutSubject
        );
        assert_eq!(
            BackfillDecision::decide(&attempt(None), Some(&quiz(None))),
            BackfillDecision::QuizWithoutSubject
        );
    }
}
