//! Guild membership lifecycle: record creation on join, soft deactivation
//! on leave.

use std::sync::Arc;

use serenity::all::{Context, Guild, UnavailableGuild};
use tracing::{info, warn};

use crate::infrastructure::botdata::Data;
use crate::services::guilds;

pub async fn on_guild_create(ctx: &Context, data: &Arc<Data>, guild: &Guild, is_new: Option<bool>) {
    if let Err(e) = guilds::find_or_create(&data.db, guild.id, &guild.name).await {
        warn!(guild = %guild.id, "Failed to persist guild on create: {e:?}");
        return;
    }
    // `is_new` is false for the replay of existing guilds at startup; only
    // a genuine join gets the welcome.
    if is_new != Some(true) {
        return;
    }
    info!("Joined new guild: {} ({})", guild.name, guild.id);
    let Some(channel) = guild.system_channel_id else {
        return;
    };
    let welcome = format!(
        "Hello! Thanks for adding me. Use `/help` or `{}help` to see what I can do.",
        guilds::DEFAULT_PREFIX
    );
    if let Err(e) = channel.say(&ctx.http, welcome).await {
        warn!(guild = %guild.id, "Failed to send the welcome message: {e:?}");
    }
}

pub async fn on_guild_delete(data: &Arc<Data>, incomplete: &UnavailableGuild) {
    // An outage marks the guild unavailable without the bot leaving it.
    if incomplete.unavailable {
        return;
    }
    info!("Removed from guild {}", incomplete.id);
    if let Err(e) = guilds::set_inactive(&data.db, incomplete.id).await {
        warn!(guild = %incomplete.id, "Failed to mark guild inactive: {e:?}");
    }
}
