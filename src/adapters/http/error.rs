//! Error bodies shared by every HTTP endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::entitlement::{PaymentProvider, WebhookError};
use crate::domain::foundation::{DomainError, ValidationError};

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// API error type that converts domain errors to HTTP responses.
///
/// Server-side failure messages are replaced with a generic text unless
/// verbose errors are enabled.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn webhook(err: &WebhookError, verbose: bool) -> Self {
        let status = err.status_code();
        let message = if status.is_server_error() && !verbose {
            "Failed to apply webhook, retry later".to_string()
        } else {
            err.to_string()
        };
        Self {
            status,
            body: ErrorResponse::new(err.error_code(), message),
        }
    }

    pub fn domain(err: &DomainError, verbose: bool) -> Self {
        let mut body = if verbose {
            ErrorResponse::new(err.code.to_string(), err.message.clone())
        } else {
            ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
        };
        if verbose && !err.details.is_empty() {
            body.details = serde_json::to_value(&err.details).ok();
        }
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body,
        }
    }

    pub fn validation(err: &ValidationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::new("VALIDATION_FAILED", err.to_string()),
        }
    }

    pub fn provider_disabled(provider: PaymentProvider) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorResponse::new(
                "PROVIDER_DISABLED",
                format!("Webhooks for {} are not enabled", provider),
            ),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
