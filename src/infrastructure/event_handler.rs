use std::sync::Arc;

use serenity::all::{Context, EventHandler, Guild, Interaction, Message, Ready, UnavailableGuild};
use serenity::async_trait;
use tracing::warn;

use crate::events;
use crate::infrastructure::botdata::Data;

/// Gateway event fan-out. Each callback delegates to its adapter and logs
/// failures; nothing here is allowed to take the gateway loop down.
pub struct Handler {
    pub data: Arc<Data>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        events::ready::on_ready(&ctx, &self.data, &ready).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if let Err(e) = events::message::on_message(&ctx, &self.data, &msg).await {
            warn!(author = %msg.author.id, "Message handling failed: {e:?}");
            let notice = "There was an error executing this command!";
            if let Err(e) = msg.reply(&ctx.http, notice).await {
                warn!(channel = %msg.channel_id, "Failed to deliver the error notice: {e:?}");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Err(e) = events::interaction::on_interaction(&ctx, &self.data, &interaction).await {
            warn!("Interaction handling failed: {e:?}");
        }
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: Option<bool>) {
        events::guild::on_guild_create(&ctx, &self.data, &guild, is_new).await;
    }

    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        events::guild::on_guild_delete(&self.data, &incomplete).await;
    }
}
