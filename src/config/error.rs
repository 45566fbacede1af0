//! Errors raised while loading or checking `QUIZGOD__*` settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("configuration rejected: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A setting that parsed but makes no sense for this service.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required setting {0}")]
    MissingRequired(&'static str),

    #[error("server host/port does not form a socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("server port must be non-zero")]
    InvalidPort,

    #[error("request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("database url must start with postgres:// or postgresql://")]
    InvalidDatabaseUrl,

    #[error("redis url must start with redis:// or rediss://")]
    InvalidRedisUrl,

    #[error("database min_connections is larger than max_connections")]
    InvalidPoolSize,

    #[error("database max_connections is above 100")]
    PoolSizeTooLarge,

    #[error("stripe webhook secret must start with whsec_")]
    InvalidStripeWebhookSecret,

    #[error("webhook ledger TTL must be at least one day")]
    LedgerTtlTooShort,

    #[error("webhook ledger retention must be at least one day")]
    InvalidLedgerRetention,

    #[error("no payment provider webhook is enabled")]
    NoProviderEnabled,
}
