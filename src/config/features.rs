//! Feature flags configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Skip webhook events whose id is already in the ledger
    #[serde(default = "default_true")]
    pub dedup_webhooks: bool,

    /// Days a PostgreSQL ledger record is kept before purging
    #[serde(default = "default_ledger_retention_days")]
    pub ledger_retention_days: u32,

    /// Show detailed error messages (disable in production!)
    #[serde(default)]
    pub verbose_errors: bool,
}

impl FeatureFlags {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ledger_retention_days == 0 {
            return Err(ValidationError::InvalidLedgerRetention);
        }
        Ok(())
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            dedup_webhooks: true,
            ledger_retention_days: default_ledger_retention_days(),
            verbose_errors: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ledger_retention_days() -> u32 {
    30
}
