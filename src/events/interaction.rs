//! Slash-command ingestion.

use std::sync::Arc;

use serenity::all::{Context, Interaction};
use tracing::{info, warn};

use crate::dispatch::args::Args;
use crate::dispatch::context::{GuildRef, Invocation};
use crate::dispatch::core::{self, Outcome};
use crate::dispatch::reply::{BotReply, ReplySink};
use crate::infrastructure::botdata::Data;

pub async fn on_interaction(
    ctx: &Context,
    data: &Arc<Data>,
    interaction: &Interaction,
) -> anyhow::Result<()> {
    let Interaction::Command(command) = interaction else {
        return Ok(());
    };

    let guild = command.guild_id.map(|id| GuildRef {
        id,
        name: ctx
            .cache
            .guild(id)
            .map(|cached| cached.name.clone())
            .unwrap_or_default(),
    });
    // Discord resolves the member's effective permissions for us on this
    // path; absent member data means a DM invocation.
    let permissions = command.member.as_deref().and_then(|m| m.permissions);
    let args = Args::from_resolved(&command.data.options());

    let inv = Invocation {
        discord: ctx.clone(),
        data: Arc::clone(data),
        actor: command.user.clone(),
        guild,
        permissions,
        command: command.data.name.clone(),
        args,
        sink: ReplySink::for_interaction(command.clone()),
    };

    match core::dispatch(&inv).await {
        Outcome::Executed => {
            info!(command = %inv.command, actor = %inv.actor.id, guild = ?inv.guild_id(),
                "Executed slash command");
        }
        Outcome::Rejected(rejection) => {
            inv.reply(BotReply::new().content(rejection.to_string()).ephemeral(true))
                .await?;
        }
        // Only reachable when the registration set and the registry have
        // drifted apart, so it is worth a warning.
        Outcome::NotFound => {
            warn!(command = %inv.command, "Received unknown slash command");
            inv.reply(BotReply::new().content("Unknown command.").ephemeral(true))
                .await?;
        }
    }
    Ok(())
}
