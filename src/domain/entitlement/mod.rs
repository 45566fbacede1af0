//! Premium entitlement domain.
//!
//! Provider payloads are decoded into per-provider event enums
//! ([`StripeEvent`], [`FastSpringEvent`], [`PaddleEvent`]) and classified into
//! a [`Classification`]. Grants and revocations are applied to a
//! [`UserEntitlement`] with last-write-wins semantics.

mod classification;
mod fastspring_event;
mod paddle_event;
mod provider;
mod record;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use classification::{Classification, ClassifyEvent, IgnoreReason, SubjectRef};
pub use fastspring_event::{
    FastSpringEvent, FastSpringEventKind, FastSpringOrder, FastSpringOrderItem,
    FastSpringSubscription, FastSpringTags,
};
pub use paddle_event::{PaddleCustomData, PaddleEvent, PaddleEventKind, PaddleSubscription};
pub use provider::PaymentProvider;
pub use record::{EntitlementGrant, EntitlementRevocation, UserEntitlement};
pub use stripe_event::{CheckoutSession, StripeEvent, StripeEventKind, StripeSubscription};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier};
