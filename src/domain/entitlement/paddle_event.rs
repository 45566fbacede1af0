//! Paddle webhook events.

use serde::Deserialize;

use super::classification::{subject_from, Classification, ClassifyEvent, IgnoreReason};
use super::webhook_errors::WebhookError;
use super::{EntitlementGrant, EntitlementRevocation, PaymentProvider};

#[derive(Debug, Clone, PartialEq)]
pub struct PaddleEvent {
    pub event_id: Option<String>,
    pub event_type: String,
    pub occurred_at: Option<String>,
    pub kind: PaddleEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaddleEventKind {
    SubscriptionCreated(PaddleSubscription),
    SubscriptionActivated(PaddleSubscription),
    SubscriptionUpdated(PaddleSubscription),
    SubscriptionCanceled(PaddleSubscription),
    SubscriptionPaused(PaddleSubscription),
    SubscriptionPastDue(PaddleSubscription),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaddleSubscription {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub custom_data: Option<PaddleCustomData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaddleCustomData {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    event_id: Option<String>,
    event_type: String,
    #[serde(default)]
    occurred_at: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

impl PaddleEvent {
    pub fn from_slice(payload: &[u8]) -> Result<Self, WebhookError> {
        let envelope: Envelope = serde_json::from_slice(payload)?;
        let data = envelope.data;

        let kind = match envelope.event_type.as_str() {
            "subscription.created" => PaddleEventKind::SubscriptionCreated(serde_json::from_value(data)?),
            "subscription.activated" => {
                PaddleEventKind::SubscriptionActivated(serde_json::from_value(data)?)
            }
            "subscription.updated" => PaddleEventKind::SubscriptionUpdated(serde_json::from_value(data)?),
            "subscription.canceled" => {
                PaddleEventKind::SubscriptionCanceled(serde_json::from_value(data)?)
            }
            "subscription.paused" => PaddleEventKind::SubscriptionPaused(serde_json::from_value(data)?),
            "subscription.past_due" => {
                PaddleEventKind::SubscriptionPastDue(serde_json::from_value(data)?)
            }
            _ => PaddleEventKind::Other,
        };

        Ok(PaddleEvent {
            event_id: envelope.event_id.filter(|id| !id.trim().is_empty()),
            event_type: envelope.event_type,
            occurred_at: envelope.occurred_at,
            kind,
        })
    }
}

impl PaddleSubscription {
    pub fn user_id(&self) -> Option<&str> {
        self.custom_data.as_ref().and_then(|c| c.user_id.as_deref())
    }

    fn classify_status_change(&self) -> Classification {
        match self.status.as_deref() {
            Some("active") => Classification::grant_for(
                subject_from(self.user_id(), None),
                EntitlementGrant::new(PaymentProvider::Paddle, "active")
                    .with_customer_id(self.customer_id.clone()),
            ),
            other => Classification::ignore(IgnoreReason::UnhandledStatus(
                other.unwrap_or("none").to_string(),
            )),
        }
    }
}

impl ClassifyEvent for PaddleEvent {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Paddle
    }

    fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn classify(&self) -> Classification {
        match &self.kind {
            PaddleEventKind::SubscriptionCreated(sub)
            | PaddleEventKind::SubscriptionActivated(sub)
            | PaddleEventKind::SubscriptionUpdated(sub) => sub.classify_status_change(),
            PaddleEventKind::SubscriptionCanceled(sub) => Classification::revoke_for(
                subject_from(sub.user_id(), None),
                EntitlementRevocation::new(PaymentProvider::Paddle, "canceled"),
            ),
            PaddleEventKind::SubscriptionPaused(sub) => Classification::revoke_for(
                subject_from(sub.user_id(), None),
                EntitlementRevocation::new(PaymentProvider::Paddle, "paused"),
            ),
            PaddleEventKind::SubscriptionPastDue(_) => Classification::ignore(IgnoreReason::PastDue),
            PaddleEventKind::Other => Classification::ignore(IgnoreReason::UnhandledEventType(
                self.event_type.clone(),
            )),
        }
    }
}
