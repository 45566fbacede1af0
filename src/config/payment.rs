//! Payment provider webhook configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Which provider endpoints are mounted, and the Stripe signing secret.
///
/// The Stripe endpoint is mounted only when a signing secret is configured.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe webhook signing secret (`whsec_...`)
    pub stripe_webhook_secret: Option<SecretString>,

    #[serde(default = "default_enabled")]
    pub fastspring_enabled: bool,

    #[serde(default = "default_enabled")]
    pub paddle_enabled: bool,
}

impl PaymentConfig {
    pub fn stripe_enabled(&self) -> bool {
        self.stripe_webhook_secret.is_some()
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(secret) = &self.stripe_webhook_secret {
            if !secret.expose_secret().starts_with("whsec_") {
                return Err(ValidationError::InvalidStripeWebhookSecret);
            }
        }
        if !self.stripe_enabled() && !self.fastspring_enabled && !self.paddle_enabled {
            return Err(ValidationError::NoProviderEnabled);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_webhook_secret: None,
            fastspring_enabled: default_enabled(),
            paddle_enabled: default_enabled(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secret(secret: &str) -> PaymentConfig {
        PaymentConfig {
            stripe_webhook_secret: Some(SecretString::new(secret.to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_enable_unsigned_providers() {
        let config = PaymentConfig::default();
        assert!(config.fastspring_enabled);
        assert!(config.paddle_enabled);
        assert!(!config.stripe_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_webhook_secret_prefix() {
        assert_eq!(
            with_secret("secret_xxx").validate(),
            Err(ValidationError::InvalidStripeWebhookSecret)
        );
    }

    #[test]
    fn test_validation_valid_secret() {
        let config = with_secret("whsec_xyz789");
        assert!(config.stripe_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_requires_some_provider() {
        let config = PaymentConfig {
            stripe_webhook_secret: None,
            fastspring_enabled: false,
            paddle_enabled: false,
        };
        assert_eq!(config.validate(), Err(ValidationError::NoProviderEnabled));
    }

    #[test]
    fn test_secret_is_redacted_in_debug_output() {
        let rendered = format!("{:?}", with_secret("whsec_topsecret"));
        assert!(!rendered.contains("topsecret"));
    }
}
