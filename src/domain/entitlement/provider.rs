//! Payment providers that originate webhook events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// External payment service that can change a user's entitlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    /// Signed webhooks (`Stripe-Signature`).
    Stripe,
    /// Unsigned event lists.
    FastSpring,
    /// Unsigned single events.
    Paddle,
}

impl PaymentProvider {
    /// Every provider with a webhook endpoint.
    pub const ALL: [PaymentProvider; 3] = [
        PaymentProvider::Stripe,
        PaymentProvider::FastSpring,
        PaymentProvider::Paddle,
    ];

    /// Stable lowercase name, used in storage and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::Stripe => "stripe",
            PaymentProvider::FastSpring => "fastspring",
            PaymentProvider::Paddle => "paddle",
        }
    }
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentProvider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stripe" => Ok(PaymentProvider::Stripe),
            "fastspring" => Ok(PaymentProvider::FastSpring),
            "paddle" => Ok(PaymentProvider::Paddle),
            other => Err(ValidationError::invalid_format(
                "provider",
                format!("unknown payment provider '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_roundtrip_through_from_str() {
        for provider in PaymentProvider::ALL {
            assert_eq!(provider.as_str().parse::<PaymentProvider>().unwrap(), provider);
        }
    }

    #[test]
    fn provider_parsing_is_case_insensitive() {
        assert_eq!(
            "FastSpring".parse::<PaymentProvider>().unwrap(),
            PaymentProvider::FastSpring
        );
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!("paymongo".parse::<PaymentProvider>().is_err());
    }

    #[test]
    fn provider_serializes_lowercase() {
        let json = serde_json::to_string(&PaymentProvider::FastSpring).unwrap();
        assert_eq!(json, "\"fastspring\"");
    }
}
