//! Axum router configuration for entitlement endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    check_premium, fastspring_webhook, paddle_webhook, stripe_webhook, EntitlementAppState,
};

/// Create the webhook router.
///
/// Every provider is mounted; a disabled provider's handler answers 404
/// with `PROVIDER_DISABLED`.
///
/// # Routes
/// - `POST /stripe` - signature verified
/// - `POST /fastspring` - batched events
/// - `POST /paddle`
pub fn webhook_routes() -> Router<EntitlementAppState> {
    Router::new()
        .route("/stripe", post(stripe_webhook))
        .route("/fastspring", post(fastspring_webhook))
        .route("/paddle", post(paddle_webhook))
}

/// # Routes
/// - `GET /:user_id/premium`
pub fn user_routes() -> Router<EntitlementAppState> {
    Router::new().route("/:user_id/premium", get(check_premium))
}

/// Combines webhook and user routes for mounting under `/api`.
pub fn entitlement_router() -> Router<EntitlementAppState> {
    Router::new()
        .nest("/webhooks", webhook_routes())
        .nest("/users", user_routes())
}
