//! Stripe webhook events.
//!
//! The envelope is parsed first, then `data.object` is decoded into a typed
//! struct chosen by the event type. Event types outside the entitlement flow
//! keep only their type string.

use std::collections::HashMap;

use serde::Deserialize;

use super::classification::{subject_from, Classification, ClassifyEvent, IgnoreReason};
use super::webhook_errors::WebhookError;
use super::{EntitlementGrant, EntitlementRevocation, PaymentProvider};

/// Metadata key the checkout page writes the user id under.
const USER_ID_KEY: &str = "userId";
const USER_ID_KEY_SNAKE: &str = "user_id";

/// Stripe event as received on the webhook endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct StripeEvent {
    /// Unique event id (`evt_...`).
    pub id: String,
    pub event_type: String,
    /// Unix timestamp when the event was created.
    pub created: i64,
    pub livemode: bool,
    pub kind: StripeEventKind,
}

/// The event types this service acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum StripeEventKind {
    CheckoutSessionCompleted(CheckoutSession),
    SubscriptionCreated(StripeSubscription),
    SubscriptionUpdated(StripeSubscription),
    SubscriptionDeleted(StripeSubscription),
    Other,
}

/// Checkout Session object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Subscription object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Deserialize)]
struct Envelope {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: i64,
    #[serde(default)]
    livemode: bool,
    data: EnvelopeData,
}

#[derive(Deserialize)]
struct EnvelopeData {
    object: serde_json::Value,
}

impl StripeEvent {
    /// Decodes a raw (already verified) Stripe payload.
    pub fn from_slice(payload: &[u8]) -> Result<Self, WebhookError> {
        let envelope: Envelope = serde_json::from_slice(payload)?;
        let object = envelope.data.object;

        let kind = match envelope.event_type.as_str() {
            "checkout.session.completed" => {
                StripeEventKind::CheckoutSessionCompleted(serde_json::from_value(object)?)
            }
            "customer.subscription.created" => {
                StripeEventKind::SubscriptionCreated(serde_json::from_value(object)?)
            }
            "customer.subscription.updated" => {
                StripeEventKind::SubscriptionUpdated(serde_json::from_value(object)?)
            }
            "customer.subscription.deleted" => {
                StripeEventKind::SubscriptionDeleted(serde_json::from_value(object)?)
            }
            _ => StripeEventKind::Other,
        };

        Ok(StripeEvent {
            id: envelope.id,
            event_type: envelope.event_type,
            created: envelope.created,
            livemode: envelope.livemode,
            kind,
        })
    }
}

fn metadata_user_id(metadata: &HashMap<String, String>) -> Option<&str> {
    metadata
        .get(USER_ID_KEY)
        .or_else(|| metadata.get(USER_ID_KEY_SNAKE))
        .map(String::as_str)
}

impl CheckoutSession {
    /// User id from metadata, falling back to `client_reference_id`.
    pub fn user_id(&self) -> Option<&str> {
        metadata_user_id(&self.metadata)
            .filter(|id| !id.trim().is_empty())
            .or(self.client_reference_id.as_deref())
    }
}

impl StripeSubscription {
    pub fn user_id(&self) -> Option<&str> {
        metadata_user_id(&self.metadata)
    }

    /// `active` and `trialing` subscriptions carry premium access.
    pub fn grants_access(&self) -> bool {
        matches!(self.status.as_str(), "active" | "trialing")
    }

    fn classify_change(&self) -> Classification {
        let subject = subject_from(self.user_id(), self.customer.as_deref());
        if self.grants_access() {
            Classification::grant_for(
                subject,
                EntitlementGrant::new(PaymentProvider::Stripe, self.status.clone())
                    .with_customer_id(self.customer.clone()),
            )
        } else {
            Classification::revoke_for(
                subject,
                EntitlementRevocation::new(PaymentProvider::Stripe, self.status.clone()),
            )
        }
    }
}

impl ClassifyEvent for StripeEvent {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Stripe
    }

    fn event_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn classify(&self) -> Classification {
        match &self.kind {
            StripeEventKind::CheckoutSessionCompleted(session) => {
                // A checkout always names the user; customer lookup is not attempted.
                let subject = subject_from(session.user_id(), None);
                Classification::grant_for(
                    subject,
                    EntitlementGrant::new(PaymentProvider::Stripe, "active")
                        .with_customer_id(session.customer.clone()),
                )
            }
            StripeEventKind::SubscriptionCreated(sub)
            | StripeEventKind::SubscriptionUpdated(sub) => sub.classify_change(),
            StripeEventKind::SubscriptionDeleted(sub) => Classification::revoke_for(
                subject_from(sub.user_id(), sub.customer.as_deref()),
                EntitlementRevocation::new(PaymentProvider::Stripe, "canceled"),
            ),
            StripeEventKind::Other => Classification::ignore(IgnoreReason::UnhandledEventType(
                self.event_type.clone(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::SubjectRef;
    use crate::domain::foundation::UserId;
    use proptest::prelude::*;

    fn event(event_type: &str, object: serde_json::Value) -> StripeEvent {
        let payload = serde_json::json!({
            "id": "evt_1",
            "type": event_type,
            "created": 1_700_000_000,
            "livemode": false,
            "data": { "object": object }
        });
        StripeEvent::from_slice(payload.to_string().as_bytes()).unwrap()
    }

    fn user(id: &str) -> SubjectRef {
        SubjectRef::User(UserId::new(id).unwrap())
    }

    // ══════════════════════════════════════════════════════════════
    // Parsing
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parses_checkout_session_completed() {
        let event = event(
            "checkout.session.completed",
            serde_json::json!({
                "id": "cs_1",
                "customer": "cus_1",
                "metadata": { "userId": "u1" }
            }),
        );

        assert_eq!(event.id, "evt_1");
        assert_eq!(event.created, 1_700_000_000);
        assert!(!event.livemode);
        match event.kind {
            StripeEventKind::CheckoutSessionCompleted(session) => {
                assert_eq!(session.customer.as_deref(), Some("cus_1"));
                assert_eq!(session.user_id(), Some("u1"));
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn unknown_event_type_is_kept_as_other() {
        let event = event("invoice.paid", serde_json::json!({ "anything": true }));
        assert_eq!(event.kind, StripeEventKind::Other);
        assert_eq!(event.event_type, "invoice.paid");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            StripeEvent::from_slice(b"not json"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn subscription_without_status_is_a_parse_error() {
        let payload = serde_json::json!({
            "id": "evt_1",
            "type": "customer.subscription.updated",
            "data": { "object": { "id": "sub_1" } }
        });
        assert!(StripeEvent::from_slice(payload.to_string().as_bytes()).is_err());
    }

    // ══════════════════════════════════════════════════════════════
    // Classification
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn checkout_grants_with_customer_id() {
        let event = event(
            "checkout.session.completed",
            serde_json::json!({
                "id": "cs_1",
                "customer": "cus_1",
                "metadata": { "userId": "u1" }
            }),
        );

        assert_eq!(
            event.classify(),
            Classification::Grant {
                subject: user("u1"),
                grant: EntitlementGrant::new(PaymentProvider::Stripe, "active")
                    .with_customer_id(Some("cus_1".to_string())),
            }
        );
    }

    #[test]
    fn checkout_falls_back_to_client_reference_id() {
        let event = event(
            "checkout.session.completed",
            serde_json::json!({ "id": "cs_1", "client_reference_id": "u7" }),
        );
        assert!(matches!(
            event.classify(),
            Classification::Grant { subject, .. } if subject == user("u7")
        ));
    }

    #[test]
    fn checkout_without_user_is_ignored() {
        let event = event(
            "checkout.session.completed",
            serde_json::json!({ "id": "cs_1", "customer": "cus_1" }),
        );
        assert_eq!(
            event.classify(),
            Classification::ignore(IgnoreReason::MissingSubject)
        );
    }

    #[test]
    fn trialing_subscription_grants() {
        let event = event(
            "customer.subscription.created",
            serde_json::json!({
                "id": "sub_1",
                "customer": "cus_1",
                "status": "trialing",
                "metadata": { "userId": "u1" }
            }),
        );
        match event.classify() {
            Classification::Grant { grant, .. } => assert_eq!(grant.status, "trialing"),
            other => panic!("expected grant, got {:?}", other),
        }
    }

    #[test]
    fn unpaid_subscription_update_revokes_with_status() {
        let event = event(
            "customer.subscription.updated",
            serde_json::json!({ "id": "sub_1", "customer": "cus_1", "status": "unpaid" }),
        );
        assert_eq!(
            event.classify(),
            Classification::Revoke {
                subject: SubjectRef::Customer("cus_1".to_string()),
                revocation: EntitlementRevocation::new(PaymentProvider::Stripe, "unpaid"),
            }
        );
    }

    #[test]
    fn subscription_deleted_revokes_as_canceled() {
        let event = event(
            "customer.subscription.deleted",
            serde_json::json!({
                "id": "sub_1",
                "status": "active",
                "metadata": { "user_id": "u3" }
            }),
        );
        assert_eq!(
            event.classify(),
            Classification::Revoke {
                subject: user("u3"),
                revocation: EntitlementRevocation::new(PaymentProvider::Stripe, "canceled"),
            }
        );
    }

    #[test]
    fn other_events_are_ignored() {
        let event = event("charge.refunded", serde_json::json!({}));
        assert_eq!(
            event.classify(),
            Classification::ignore(IgnoreReason::UnhandledEventType("charge.refunded".into()))
        );
    }

    proptest! {
        #[test]
        fn subscription_status_decides_grant_or_revoke(status in "[a-z_]{1,20}") {
            let event = event(
                "customer.subscription.updated",
                serde_json::json!({
                    "id": "sub_1",
                    "status": status.clone(),
                    "metadata": { "userId": "u1" }
                }),
            );
            let granted = matches!(event.classify(), Classification::Grant { .. });
            prop_assert_eq!(granted, status == "active" || status == "trialing");
        }

        #[test]
        fn unlisted_event_types_never_mutate(suffix in "[a-z]{1,12}") {
            let event = event(&format!("invoice.{}", suffix), serde_json::json!({}));
            prop_assert_eq!(event.classify().label(), "ignore");
        }
    }
}
