//! Mapping of provider events onto entitlement changes.
//!
//! Each provider parses its payload into its own event enum; the
//! [`ClassifyEvent`] impl on that enum is the only place that decides whether
//! an event grants, revokes, or is ignored.

use std::fmt;

use super::{EntitlementGrant, EntitlementRevocation, PaymentProvider};
use crate::domain::foundation::UserId;

/// Who an event is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectRef {
    /// User id carried directly in metadata, tags, or custom data.
    User(UserId),
    /// Provider customer id that must be looked up in the store.
    Customer(String),
}

/// Why an event produced no mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The event type is not part of the entitlement flow.
    UnhandledEventType(String),
    /// Neither a user id nor a customer id could be found on the event.
    MissingSubject,
    /// A customer id was present but no user record references it.
    UnknownCustomer(String),
    /// An order that did not contain a premium product.
    NotPremiumPurchase,
    /// A subscription event whose status neither grants nor revokes.
    UnhandledStatus(String),
    /// Payment is overdue; logged only.
    PastDue,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::UnhandledEventType(t) => write!(f, "unhandled event type '{}'", t),
            IgnoreReason::MissingSubject => write!(f, "no user id on event"),
            IgnoreReason::UnknownCustomer(c) => write!(f, "no user for customer '{}'", c),
            IgnoreReason::NotPremiumPurchase => write!(f, "order contains no premium product"),
            IgnoreReason::UnhandledStatus(s) => write!(f, "subscription status '{}' not handled", s),
            IgnoreReason::PastDue => write!(f, "subscription past due"),
        }
    }
}

/// Result of classifying one provider event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Grant {
        subject: SubjectRef,
        grant: EntitlementGrant,
    },
    Revoke {
        subject: SubjectRef,
        revocation: EntitlementRevocation,
    },
    Ignore {
        reason: IgnoreReason,
    },
}

impl Classification {
    pub fn ignore(reason: IgnoreReason) -> Self {
        Classification::Ignore { reason }
    }

    /// Builds a grant, or `Ignore(MissingSubject)` when no subject was found.
    pub fn grant_for(subject: Option<SubjectRef>, grant: EntitlementGrant) -> Self {
        match subject {
            Some(subject) => Classification::Grant { subject, grant },
            None => Classification::ignore(IgnoreReason::MissingSubject),
        }
    }

    /// Builds a revocation, or `Ignore(MissingSubject)` when no subject was found.
    pub fn revoke_for(subject: Option<SubjectRef>, revocation: EntitlementRevocation) -> Self {
        match subject {
            Some(subject) => Classification::Revoke { subject, revocation },
            None => Classification::ignore(IgnoreReason::MissingSubject),
        }
    }

    /// Short label used in logs, ledger records and responses.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Grant { .. } => "grant",
            Classification::Revoke { .. } => "revoke",
            Classification::Ignore { .. } => "ignore",
        }
    }
}

/// A decoded provider event that can be classified.
pub trait ClassifyEvent: Send + Sync {
    fn provider(&self) -> PaymentProvider;

    /// Provider-assigned event id, when the provider sends one.
    fn event_id(&self) -> Option<&str>;

    /// Raw event type string as sent by the provider.
    fn event_type(&self) -> &str;

    fn classify(&self) -> Classification;
}

/// Picks the subject from an optional user id and an optional customer id.
///
/// A usable user id always wins over a customer lookup.
pub(crate) fn subject_from(user_id: Option<&str>, customer_id: Option<&str>) -> Option<SubjectRef> {
    if let Some(user) = user_id.and_then(|raw| UserId::new(raw).ok()) {
        return Some(SubjectRef::User(user));
    }
    customer_id
        .filter(|c| !c.trim().is_empty())
        .map(|c| SubjectRef::Customer(c.to_string()))
}
