use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use anyhow::Context as _;
use tracing::info;

use vigilbot::client::create_serenity_client;
use vigilbot::database::init_database;
use vigilbot::dispatch::cooldown::CooldownTracker;
use vigilbot::dispatch::registry::CommandRegistry;
use vigilbot::infrastructure::botdata::Data;
use vigilbot::infrastructure::environment;
use vigilbot::logging::init_logging;
use vigilbot::shutdown::run_until_shutdown;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = init_logging();

    let db = init_database().await?;
    let registry = CommandRegistry::load(vigilbot::commands::default_commands());
    let shard = environment::shard_info();
    if shard.is_sharded() {
        info!("Running as shard {} of {}", shard.id, shard.total);
    }

    let data = Arc::new(Data {
        db: db.clone(),
        registry,
        cooldowns: CooldownTracker::new(),
        owner: environment::owner_id(),
        shard,
        started_at: Instant::now(),
        shard_manager: OnceLock::new(),
    });

    let mut client = create_serenity_client(Arc::clone(&data)).await?;
    let shard_manager = Arc::clone(&client.shard_manager);
    let _ = data.shard_manager.set(Arc::clone(&shard_manager));

    let cleanup = move || async move {
        info!("Bot is shutting down!");
        shard_manager.shutdown_all().await;
        db.close()
            .await
            .context("Failed to close the database connection")?;
        Ok(())
    };

    // The two start paths return distinct future types; box to unify.
    let client_future: Pin<Box<dyn Future<Output = Result<(), serenity::Error>> + '_>> =
        if shard.is_sharded() {
            Box::pin(client.start_shard(shard.id, shard.total))
        } else {
            Box::pin(client.start())
        };

    run_until_shutdown(client_future, cleanup).await
}
