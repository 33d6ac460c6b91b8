use anyhow::Context;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

use crate::config::AppConfig;

/// Connects to the database and applies pending migrations. Runs exactly once
/// at startup, before the server accepts its first request; any failure here
/// aborts the process.
pub async fn init_db() -> anyhow::Result<DatabaseConnection> {
    let url = AppConfig::database_url().await?;

    connect_and_migrate(&url).await
}

pub async fn connect_and_migrate(url: &str) -> anyhow::Result<DatabaseConnection> {
    let db = Database::connect(url)
        .await
        .with_context(|| format!("cannot connect to database at `{url}`"))?;

    migration::Migrator::up(&db, None)
        .await
        .context("cannot apply database migrations")?;

    tracing::info!("database initialized");

    Ok(db)
}
