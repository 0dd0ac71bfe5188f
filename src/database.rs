use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::infrastructure::environment;

/// Connects to the configured database and brings the schema up to date.
/// Without `DATABASE_URL` a sqlite file under the data directory is used.
pub async fn init_database() -> anyhow::Result<DatabaseConnection> {
    let url = database_url()?;
    let db = Database::connect(ConnectOptions::new(&url))
        .await
        .with_context(|| format!("Failed to connect to database at {url}"))?;
    Migrator::up(&db, None)
        .await
        .context("Failed to run database migrations")?;
    info!("Database initialized.");
    Ok(db)
}

fn database_url() -> anyhow::Result<String> {
    if let Ok(url) = std::env::var(environment::DATABASE_URL) {
        return Ok(url);
    }
    let data_directory = environment::get_data_directory();
    std::fs::create_dir_all(&data_directory)
        .with_context(|| format!("Failed to create data directory {data_directory:?}"))?;
    Ok(format!(
        "sqlite://{}?mode=rwc",
        data_directory.join("bot.db").display()
    ))
}

/// Fresh in-memory database with the full schema applied.
#[cfg(test)]
pub async fn test_connection() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should connect");
    Migrator::up(&db, None)
        .await
        .expect("migrations should apply cleanly");
    db
}
