//! Startup: presence and slash-command registration.

use std::sync::Arc;

use serenity::all::{ActivityData, Command, Context, Ready};
use tracing::{error, info};

use crate::infrastructure::botdata::Data;
use crate::infrastructure::environment;

pub async fn on_ready(ctx: &Context, data: &Arc<Data>, ready: &Ready) {
    info!("Bot is ready. Logged in as {}", ready.user.name);
    info!(
        shard = data.shard.id,
        total = data.shard.total,
        guilds = ready.guilds.len(),
        "Gateway session established"
    );
    ctx.set_activity(Some(ActivityData::listening("/help")));
    register_slash_commands(ctx, data).await;
}

/// Pushes the registry's registration payloads to Discord. Scoped to
/// `GUILD_ID` when set (instant propagation, useful in development),
/// global otherwise. Registration failures are logged, never fatal; prefix
/// commands keep working regardless.
async fn register_slash_commands(ctx: &Context, data: &Arc<Data>) {
    let commands: Vec<_> = data
        .registry
        .iter()
        .map(|spec| spec.to_create_command())
        .collect();
    let count = commands.len();
    match environment::registration_guild() {
        Some(guild_id) => match guild_id.set_commands(&ctx.http, commands).await {
            Ok(_) => info!("Registered {count} slash commands in guild {guild_id}"),
            Err(e) => error!("Failed to register guild slash commands: {e:?}"),
        },
        None => match Command::set_global_commands(&ctx.http, commands).await {
            Ok(_) => info!("Registered {count} global slash commands"),
            Err(e) => error!("Failed to register global slash commands: {e:?}"),
        },
    }
}
