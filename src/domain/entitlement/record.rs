//! The premium entitlement stored on a user record.
//!
//! Both mutations are plain set-operations: applying the same grant or
//! revocation twice leaves the record exactly as applying it once (apart from
//! the bookkeeping timestamps). There is no ordering check, so the last write
//! wins when providers disagree.

use serde::{Deserialize, Serialize};

use super::PaymentProvider;
use crate::domain::foundation::{Timestamp, UserId};

/// Request to switch premium access on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementGrant {
    pub provider: PaymentProvider,
    /// Provider status recorded as `subscription_status` (e.g. "active", "trialing").
    pub status: String,
    /// Provider customer id, stored so later subscription events can be resolved.
    pub customer_id: Option<String>,
}

impl EntitlementGrant {
    pub fn new(provider: PaymentProvider, status: impl Into<String>) -> Self {
        Self {
            provider,
            status: status.into(),
            customer_id: None,
        }
    }

    pub fn with_customer_id(mut self, customer_id: Option<String>) -> Self {
        self.customer_id = customer_id;
        self
    }
}

/// Request to switch premium access off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementRevocation {
    pub provider: PaymentProvider,
    /// Provider status recorded as `subscription_status` (e.g. "canceled", "cancelled").
    pub status: String,
}

impl EntitlementRevocation {
    pub fn new(provider: PaymentProvider, status: impl Into<String>) -> Self {
        Self {
            provider,
            status: status.into(),
        }
    }
}

/// Entitlement fields of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntitlement {
    pub user_id: UserId,
    pub is_premium: bool,
    pub subscription_status: Option<String>,
    pub provider: Option<PaymentProvider>,
    pub provider_customer_id: Option<String>,
    pub premium_activated_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl UserEntitlement {
    /// A record that has never been touched by a provider.
    pub fn free(user_id: UserId, now: Timestamp) -> Self {
        Self {
            user_id,
            is_premium: false,
            subscription_status: None,
            provider: None,
            provider_customer_id: None,
            premium_activated_at: None,
            updated_at: now,
        }
    }

    /// Sets the premium flag and activation metadata.
    pub fn apply_grant(&mut self, grant: &EntitlementGrant, now: Timestamp) {
        self.is_premium = true;
        self.subscription_status = Some(grant.status.clone());
        self.provider = Some(grant.provider);
        if let Some(customer_id) = &grant.customer_id {
            self.provider_customer_id = Some(customer_id.clone());
        }
        self.premium_activated_at = Some(now);
        self.updated_at = now;
    }

    /// Clears the premium flag. Activation time and customer id are kept.
    pub fn apply_revocation(&mut self, revocation: &EntitlementRevocation, now: Timestamp) {
        self.is_premium = false;
        self.subscription_status = Some(revocation.status.clone());
        self.provider = Some(revocation.provider);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    #[test]
    fn free_record_is_not_premium() {
        let record = UserEntitlement::free(user(), Timestamp::now());
        assert!(!record.is_premium);
        assert!(record.subscription_status.is_none());
        assert!(record.premium_activated_at.is_none());
    }

    #[test]
    fn grant_sets_premium_and_activation_metadata() {
        let now = Timestamp::now();
        let mut record = UserEntitlement::free(user(), now);
        let grant = EntitlementGrant::new(PaymentProvider::Stripe, "active")
            .with_customer_id(Some("cus_123".to_string()));

        record.apply_grant(&grant, now);

        assert!(record.is_premium);
        assert_eq!(record.subscription_status.as_deref(), Some("active"));
        assert_eq!(record.provider, Some(PaymentProvider::Stripe));
        assert_eq!(record.provider_customer_id.as_deref(), Some("cus_123"));
        assert_eq!(record.premium_activated_at, Some(now));
    }

    #[test]
    fn grant_without_customer_keeps_existing_customer_id() {
        let now = Timestamp::now();
        let mut record = UserEntitlement::free(user(), now);
        record.provider_customer_id = Some("cus_old".to_string());

        record.apply_grant(&EntitlementGrant::new(PaymentProvider::Stripe, "trialing"), now);

        assert_eq!(record.provider_customer_id.as_deref(), Some("cus_old"));
    }

    #[test]
    fn revocation_clears_premium_but_keeps_history() {
        let now = Timestamp::now();
        let mut record = UserEntitlement::free(user(), now);
        record.apply_grant(
            &EntitlementGrant::new(PaymentProvider::FastSpring, "active")
                .with_customer_id(Some("fs_1".to_string())),
            now,
        );

        record.apply_revocation(
            &EntitlementRevocation::new(PaymentProvider::FastSpring, "cancelled"),
            now,
        );

        assert!(!record.is_premium);
        assert_eq!(record.subscription_status.as_deref(), Some("cancelled"));
        assert!(record.premium_activated_at.is_some());
        assert_eq!(record.provider_customer_id.as_deref(), Some("fs_1"));
    }

    #[test]
    fn applying_grant_twice_equals_applying_once() {
        let now = Timestamp::now();
        let grant = EntitlementGrant::new(PaymentProvider::Paddle, "active");

        let mut once = UserEntitlement::free(user(), now);
        once.apply_grant(&grant, now);

        let mut twice = once.clone();
        twice.apply_grant(&grant, now);

        assert_eq!(once, twice);
    }

    #[test]
    fn last_write_wins_across_providers() {
        let now = Timestamp::now();
        let mut record = UserEntitlement::free(user(), now);

        record.apply_grant(&EntitlementGrant::new(PaymentProvider::Stripe, "active"), now);
        record.apply_revocation(
            &EntitlementRevocation::new(PaymentProvider::Paddle, "canceled"),
            now,
        );

        assert!(!record.is_premium);
        assert_eq!(record.provider, Some(PaymentProvider::Paddle));
    }

    #[test]
    fn entitlement_serializes_with_camel_case_fields() {
        let record = UserEntitlement::free(user(), Timestamp::now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["isPremium"], false);
    }
}
