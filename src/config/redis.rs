//! Redis configuration (optional webhook ledger backend)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const SECS_PER_DAY: u64 = 86_400;

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,

    /// How long a processed event id is remembered, in seconds
    #[serde(default = "default_ledger_ttl")]
    pub ledger_ttl_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RedisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate Redis configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS_URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        // Providers retry for up to three days; shorter TTLs let redeliveries through.
        if self.ledger_ttl_secs < SECS_PER_DAY {
            return Err(ValidationError::LedgerTtlTooShort);
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            ledger_ttl_secs: default_ledger_ttl(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_ledger_ttl() -> u64 {
    30 * SECS_PER_DAY
}

fn default_timeout() -> u64 {
    5
}
