//! QuizGod entitlement service entry point.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use quizgod_entitlements::adapters::http::{app_router, EntitlementAppState};
use quizgod_entitlements::adapters::postgres::{PostgresEntitlementStore, PostgresWebhookLedger};
use quizgod_entitlements::adapters::redis::RedisWebhookLedger;
use quizgod_entitlements::application::PurgeWebhookLedgerHandler;
use quizgod_entitlements::config::{AppConfig, RedisConfig};
use quizgod_entitlements::domain::entitlement::StripeWebhookVerifier;
use quizgod_entitlements::ports::WebhookLedger;

/// How often old PostgreSQL ledger records are purged.
const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        database = %config.database.redacted_url(),
        "Starting QuizGod entitlement service"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let mut state =
        EntitlementAppState::new(Arc::new(PostgresEntitlementStore::new(pool.clone())));
    state.fastspring_enabled = config.payment.fastspring_enabled;
    state.paddle_enabled = config.payment.paddle_enabled;
    state.verbose_errors = config.features.verbose_errors;

    if let Some(secret) = &config.payment.stripe_webhook_secret {
        state = state.with_stripe_verifier(StripeWebhookVerifier::new(secret.clone()));
    }

    if config.features.dedup_webhooks {
        let ledger = match &config.redis {
            Some(redis) => connect_redis_ledger(redis).await?,
            None => {
                let ledger: Arc<dyn WebhookLedger> =
                    Arc::new(PostgresWebhookLedger::new(pool.clone()));
                spawn_ledger_purge(ledger.clone(), config.features.ledger_retention_days);
                ledger
            }
        };
        state = state.with_ledger(ledger);
    } else {
        tracing::warn!("Webhook deduplication disabled");
    }

    let app = app_router(state, &config.server);
    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn connect_redis_ledger(redis: &RedisConfig) -> Result<Arc<dyn WebhookLedger>, BoxError> {
    let client = redis::Client::open(redis.url.as_str())?;
    let conn = tokio::time::timeout(redis.timeout(), client.get_multiplexed_tokio_connection())
        .await
        .map_err(|_| "timed out connecting to Redis")??;
    tracing::info!(ttl_secs = redis.ledger_ttl_secs, "Using Redis webhook ledger");
    Ok(Arc::new(RedisWebhookLedger::new(conn, redis.ledger_ttl_secs)))
}

fn spawn_ledger_purge(ledger: Arc<dyn WebhookLedger>, retention_days: u32) {
    let handler = PurgeWebhookLedgerHandler::new(ledger, retention_days);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = handler.handle().await {
                tracing::warn!(error = %e, "Webhook ledger purge failed");
            }
        }
    });
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
}

async fn close_pool(pool: PgPool) {
    pool.close().await;
    tracing::info!("Database pool closed");
}
