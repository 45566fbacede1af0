//! Response bodies for webhook and premium endpoints.

use serde::{Deserialize, Serialize};

use crate::application::{CheckPremiumResult, EventDisposition, ProcessedEvent};

/// Acknowledgement returned to payment providers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookAckResponse {
    pub received: bool,
    /// Set when the ledger already held the event.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    /// Per-event outcomes for batched providers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventOutcomeResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventOutcomeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub outcome: String,
}

impl From<&ProcessedEvent> for EventOutcomeResponse {
    fn from(event: &ProcessedEvent) -> Self {
        Self {
            id: event.event_id.clone(),
            event_type: event.event_type.clone(),
            outcome: event.disposition.label().to_string(),
        }
    }
}

impl WebhookAckResponse {
    pub fn single(event: &ProcessedEvent) -> Self {
        Self {
            received: true,
            duplicate: event.disposition == EventDisposition::Duplicate,
            outcome: Some(event.disposition.label().to_string()),
            events: Vec::new(),
        }
    }

    pub fn batch(events: &[ProcessedEvent]) -> Self {
        Self {
            received: true,
            duplicate: false,
            outcome: None,
            events: events.iter().map(EventOutcomeResponse::from).collect(),
        }
    }
}

/// Body of `GET /api/users/:user_id/premium`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PremiumStatusResponse {
    pub user_id: String,
    pub is_premium: bool,
}

impl From<CheckPremiumResult> for PremiumStatusResponse {
    fn from(result: CheckPremiumResult) -> Self {
        Self {
            user_id: result.user_id.to_string(),
            is_premium: result.is_premium,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::PaymentProvider;
    use crate::domain::foundation::UserId;

    fn processed(disposition: EventDisposition) -> ProcessedEvent {
        ProcessedEvent {
            provider: PaymentProvider::Paddle,
            event_id: Some("evt_1".to_string()),
            event_type: "subscription.activated".to_string(),
            disposition,
        }
    }

    #[test]
    fn single_ack_omits_duplicate_flag_when_false() {
        let ack = WebhookAckResponse::single(&processed(EventDisposition::Granted {
            user_id: UserId::new("u1").unwrap(),
        }));
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json, serde_json::json!({ "received": true, "outcome": "granted" }));
    }

    #[test]
    fn duplicate_ack_sets_flag() {
        let ack = WebhookAckResponse::single(&processed(EventDisposition::Duplicate));
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["duplicate"], true);
    }

    #[test]
    fn premium_response_uses_camel_case() {
        let response = PremiumStatusResponse {
            user_id: "u1".to_string(),
            is_premium: true,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({ "userId": "u1", "isPremium": true }));
    }
}
