use anyhow::Context;
use datarules_pipeline::{PgRecordStore, RuleRunner};
use datarules_worker::WorkerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "datarules_worker=debug,datarules_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env()?;
    tracing::info!(entity_types = ?config.entity_types, "Worker starting");

    let pool = datarules_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;
    datarules_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let runner = RuleRunner::new(PgRecordStore::new(pool.clone()));
    let outcome = datarules_worker::run(&runner, &config.entity_types).await;
    pool.close().await;

    println!("{}", serde_json::to_string(&outcome.succeeded)?);
    tracing::info!(
        modified = outcome.modified(),
        deleted = outcome.deleted(),
        failed = outcome.failed.len(),
        "Worker finished",
    );

    if !outcome.is_success() {
        let kinds: Vec<String> = outcome
            .failed
            .iter()
            .map(|report| report.entity_type.to_string())
            .collect();
        anyhow::bail!("Rule application failed for: {}", kinds.join(", "));
    }
    Ok(())
}
