//! One-off repair: copies each quiz's subject onto attempts missing it.
//!
//! Usage: `backfill-attempt-subjects [--dry-run] [--page-size N]`
//!
//! Reads the same `QUIZGOD__DATABASE__*` settings as the service and prints
//! the final report as JSON.

use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use quizgod_entitlements::adapters::postgres::PostgresQuizAttemptStore;
use quizgod_entitlements::application::{
    BackfillAttemptSubjectsCommand, BackfillAttemptSubjectsHandler,
};
use quizgod_entitlements::config::AppConfig;

type BoxError = Box<dyn Error + Send + Sync>;

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<BackfillAttemptSubjectsCommand, BoxError> {
    let mut cmd = BackfillAttemptSubjectsCommand::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dry-run" => cmd.dry_run = true,
            "--page-size" => {
                let value = args.next().ok_or("--page-size needs a value")?;
                cmd.page_size = value
                    .parse()
                    .map_err(|_| format!("invalid page size: {}", value))?;
            }
            other => return Err(format!("unknown argument: {}", other).into()),
        }
    }
    Ok(cmd)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();
    config.database.validate()?;

    let cmd = parse_args(std::env::args().skip(1))?;
    tracing::info!(
        page_size = cmd.page_size,
        dry_run = cmd.dry_run,
        database = %config.database.redacted_url(),
        "Starting attempt subject backfill"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    let handler = BackfillAttemptSubjectsHandler::new(Arc::new(PostgresQuizAttemptStore::new(
        pool.clone(),
    )));

    let report = handler.handle(cmd).await?;
    pool.close().await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
