//! FastSpring webhook events.
//!
//! FastSpring posts a batch `{ "events": [...] }`; each entry is classified on
//! its own.

use serde::Deserialize;

use super::classification::{subject_from, Classification, ClassifyEvent, IgnoreReason};
use super::webhook_errors::WebhookError;
use super::{EntitlementGrant, EntitlementRevocation, PaymentProvider};

/// Product path fragment that marks a premium purchase.
const PREMIUM_MARKER: &str = "premium";

#[derive(Debug, Clone, PartialEq)]
pub struct FastSpringEvent {
    pub id: Option<String>,
    pub event_type: String,
    pub live: bool,
    pub kind: FastSpringEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FastSpringEventKind {
    OrderCompleted(FastSpringOrder),
    SubscriptionActivated(FastSpringSubscription),
    SubscriptionCanceled(FastSpringSubscription),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FastSpringTags {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FastSpringOrderItem {
    #[serde(default)]
    pub product: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FastSpringOrder {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub items: Vec<FastSpringOrderItem>,
    #[serde(default)]
    pub tags: FastSpringTags,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FastSpringSubscription {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub tags: FastSpringTags,
}

#[derive(Deserialize)]
struct Batch {
    events: Vec<RawEvent>,
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    live: bool,
    #[serde(default)]
    data: serde_json::Value,
}

impl FastSpringEvent {
    /// Decodes a whole batch. Any malformed entry rejects the batch.
    pub fn batch_from_slice(payload: &[u8]) -> Result<Vec<Self>, WebhookError> {
        let batch: Batch = serde_json::from_slice(payload)?;
        batch.events.into_iter().map(Self::from_raw).collect()
    }

    fn from_raw(raw: RawEvent) -> Result<Self, WebhookError> {
        let kind = match raw.event_type.as_str() {
            "order.completed" => FastSpringEventKind::OrderCompleted(serde_json::from_value(raw.data)?),
            "subscription.activated" => {
                FastSpringEventKind::SubscriptionActivated(serde_json::from_value(raw.data)?)
            }
            "subscription.canceled" => {
                FastSpringEventKind::SubscriptionCanceled(serde_json::from_value(raw.data)?)
            }
            _ => FastSpringEventKind::Other,
        };

        Ok(FastSpringEvent {
            id: raw.id.filter(|id| !id.trim().is_empty()),
            event_type: raw.event_type,
            live: raw.live,
            kind,
        })
    }
}

impl FastSpringOrder {
    pub fn contains_premium(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.product.to_ascii_lowercase().contains(PREMIUM_MARKER))
    }
}

impl ClassifyEvent for FastSpringEvent {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::FastSpring
    }

    fn event_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn classify(&self) -> Classification {
        match &self.kind {
            FastSpringEventKind::OrderCompleted(order) => {
                if !order.contains_premium() {
                    return Classification::ignore(IgnoreReason::NotPremiumPurchase);
                }
                Classification::grant_for(
                    subject_from(order.tags.user_id.as_deref(), None),
                    EntitlementGrant::new(PaymentProvider::FastSpring, "active"),
                )
            }
            FastSpringEventKind::SubscriptionActivated(sub) => Classification::grant_for(
                subject_from(sub.tags.user_id.as_deref(), None),
                EntitlementGrant::new(PaymentProvider::FastSpring, "active"),
            ),
            FastSpringEventKind::SubscriptionCanceled(sub) => Classification::revoke_for(
                subject_from(sub.tags.user_id.as_deref(), None),
                EntitlementRevocation::new(PaymentProvider::FastSpring, "cancelled"),
            ),
            FastSpringEventKind::Other => Classification::ignore(IgnoreReason::UnhandledEventType(
                self.event_type.clone(),
            )),
        }
    }
}
