//! HTTP adapter for payment webhooks and premium checks.

mod dto;
mod handlers;
mod routes;

pub use dto::{EventOutcomeResponse, PremiumStatusResponse, WebhookAckResponse};
pub use handlers::{
    check_premium, fastspring_webhook, paddle_webhook, stripe_webhook, EntitlementAppState,
    STRIPE_SIGNATURE_HEADER,
};
pub use routes::{entitlement_router, user_routes, webhook_routes};
