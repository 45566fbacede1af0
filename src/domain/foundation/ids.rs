//! Strongly-typed identifier value objects.
//!
//! User, quiz and attempt ids are opaque strings issued by the document store,
//! so each wrapper only guarantees non-emptiness.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new id, returning error if empty or blank.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// User identifier (the document id of the user record).
    UserId,
    "user_id"
);

string_id!(
    /// Identifier of a quiz record.
    QuizId,
    "quiz_id"
);

string_id!(
    /// Identifier of a quiz attempt record.
    AttemptId,
    "attempt_id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_empty_string() {
        assert!(matches!(
            UserId::new(""),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn user_id_rejects_blank_string() {
        assert!(UserId::new("   ").is_err());
    }

    #[test]
    fn user_id_preserves_value() {
        let id = UserId::new("u1").unwrap();
        assert_eq!(id.as_str(), "u1");
        assert_eq!(id.to_string(), "u1");
    }

    #[test]
    fn user_id_serializes_as_plain_string() {
        let id = UserId::new("abc123").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc123\"");
    }

    #[test]
    fn user_id_deserialization_rejects_empty() {
        let result: Result<UserId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn quiz_id_reports_its_own_field_name() {
        let err = QuizId::new("").unwrap_err();
        assert_eq!(err, ValidationError::empty_field("quiz_id"));
    }

    #[test]
    fn attempt_id_converts_into_string() {
        let id = AttemptId::new("att_9").unwrap();
        let raw: String = id.into();
        assert_eq!(raw, "att_9");
    }
}
