//! HTTP handlers for provider webhooks and the premium check.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use super::dto::{PremiumStatusResponse, WebhookAckResponse};
use crate::adapters::http::error::ApiError;
use crate::application::{
    CheckPremiumHandler, CheckPremiumQuery, ProcessWebhookHandler, ProcessedEvent,
};
use crate::domain::entitlement::{
    FastSpringEvent, PaddleEvent, PaymentProvider, StripeEvent, StripeWebhookVerifier,
    WebhookError,
};
use crate::domain::foundation::UserId;
use crate::ports::{EntitlementStore, WebhookLedger};

/// Header Stripe puts the payload signature in.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for entitlement endpoints.
#[derive(Clone)]
pub struct EntitlementAppState {
    pub store: Arc<dyn EntitlementStore>,
    /// Absent when duplicate detection is turned off.
    pub ledger: Option<Arc<dyn WebhookLedger>>,
    /// Absent when no Stripe signing secret is configured.
    pub stripe_verifier: Option<Arc<StripeWebhookVerifier>>,
    pub fastspring_enabled: bool,
    pub paddle_enabled: bool,
    pub verbose_errors: bool,
}

impl EntitlementAppState {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self {
            store,
            ledger: None,
            stripe_verifier: None,
            fastspring_enabled: true,
            paddle_enabled: true,
            verbose_errors: false,
        }
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn WebhookLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_stripe_verifier(mut self, verifier: StripeWebhookVerifier) -> Self {
        self.stripe_verifier = Some(Arc::new(verifier));
        self
    }

    pub fn is_enabled(&self, provider: PaymentProvider) -> bool {
        match provider {
            PaymentProvider::Stripe => self.stripe_verifier.is_some(),
            PaymentProvider::FastSpring => self.fastspring_enabled,
            PaymentProvider::Paddle => self.paddle_enabled,
        }
    }

    pub fn webhook_handler(&self) -> ProcessWebhookHandler {
        let handler = ProcessWebhookHandler::new(self.store.clone());
        match &self.ledger {
            Some(ledger) => handler.with_ledger(ledger.clone()),
            None => handler,
        }
    }

    pub fn check_premium_handler(&self) -> CheckPremiumHandler {
        CheckPremiumHandler::new(self.store.clone())
    }

    fn webhook_error(&self, provider: PaymentProvider, err: WebhookError) -> ApiError {
        if err.is_retryable() {
            tracing::error!(provider = %provider, error = %err, "Webhook failed, provider will retry");
        } else {
            tracing::warn!(provider = %provider, error = %err, "Webhook rejected");
        }
        ApiError::webhook(&err, self.verbose_errors)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe
///
/// The raw body is verified before it is parsed. Without a signing secret
/// the endpoint answers 404.
pub async fn stripe_webhook(
    State(state): State<EntitlementAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let provider = PaymentProvider::Stripe;
    let Some(verifier) = state.stripe_verifier.as_ref() else {
        return Err(ApiError::provider_disabled(provider));
    };

    let result = async {
        let signature = headers
            .get(STRIPE_SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(WebhookError::MissingSignature)?;
        verifier.verify(&body, signature)?;

        let event = StripeEvent::from_slice(&body)?;
        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            created = event.created,
            livemode = event.livemode,
            "Stripe event verified"
        );
        let processed = state.webhook_handler().handle(&event).await?;
        Ok::<ProcessedEvent, WebhookError>(processed)
    }
    .await;

    let processed = result.map_err(|e| state.webhook_error(provider, e))?;
    Ok((StatusCode::OK, Json(WebhookAckResponse::single(&processed))))
}

/// POST /api/webhooks/fastspring
///
/// Answers 404 when FastSpring is disabled.
/// Events in a batch are applied in order. A store failure stops the batch
/// and the whole delivery is retried.
pub async fn fastspring_webhook(
    State(state): State<EntitlementAppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let provider = PaymentProvider::FastSpring;
    if !state.is_enabled(provider) {
        return Err(ApiError::provider_disabled(provider));
    }

    let result = async {
        let events = FastSpringEvent::batch_from_slice(&body)?;
        let handler = state.webhook_handler();
        let mut processed = Vec::with_capacity(events.len());
        for event in &events {
            tracing::debug!(
                event_id = event.id.as_deref().unwrap_or("-"),
                event_type = %event.event_type,
                live = event.live,
                "FastSpring event received"
            );
            processed.push(handler.handle(event).await?);
        }
        Ok::<Vec<ProcessedEvent>, WebhookError>(processed)
    }
    .await;

    let processed = result.map_err(|e| state.webhook_error(provider, e))?;
    tracing::debug!(count = processed.len(), "FastSpring batch applied");
    Ok((StatusCode::OK, Json(WebhookAckResponse::batch(&processed))))
}

/// POST /api/webhooks/paddle
///
/// Answers 404 when Paddle is disabled.
pub async fn paddle_webhook(
    State(state): State<EntitlementAppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let provider = PaymentProvider::Paddle;
    if !state.is_enabled(provider) {
        return Err(ApiError::provider_disabled(provider));
    }

    let result = async {
        let event = PaddleEvent::from_slice(&body)?;
        tracing::debug!(
            event_id = event.event_id.as_deref().unwrap_or("-"),
            event_type = %event.event_type,
            occurred_at = event.occurred_at.as_deref().unwrap_or("-"),
            "Paddle event received"
        );
        let processed = state.webhook_handler().handle(&event).await?;
        Ok::<ProcessedEvent, WebhookError>(processed)
    }
    .await;

    let processed = result.map_err(|e| state.webhook_error(provider, e))?;
    Ok((StatusCode::OK, Json(WebhookAckResponse::single(&processed))))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/users/:user_id/premium
pub async fn check_premium(
    State(state): State<EntitlementAppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = UserId::new(user_id).map_err(|e| ApiError::validation(&e))?;

    let result = state
        .check_premium_handler()
        .handle(CheckPremiumQuery { user_id })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Premium lookup failed");
            ApiError::domain(&e, state.verbose_errors)
        })?;

    Ok(Json(PremiumStatusResponse::from(result)))
}
