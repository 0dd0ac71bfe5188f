use std::sync::Arc;

use serenity::all::{Context, GuildId, Permissions, User};

use crate::dispatch::args::Args;
use crate::dispatch::reply::{BotReply, ReplySink};
use crate::infrastructure::botdata::Data;

#[derive(Debug, Clone)]
pub struct GuildRef {
    pub id: GuildId,
    pub name: String,
}

/// The normalized record an ingestion adapter produces for one inbound
/// event. Command handlers depend only on this type, never on the shape of
/// the originating interaction or message. It does not outlive the
/// processing of a single event.
pub struct Invocation {
    pub discord: Context,
    pub data: Arc<Data>,
    pub actor: User,
    pub guild: Option<GuildRef>,
    /// Effective permissions of the actor in the guild, when known. Absent
    /// inside a guild counts as the empty set; outside a guild no
    /// permission model applies.
    pub permissions: Option<Permissions>,
    pub command: String,
    pub args: Args,
    pub sink: ReplySink,
}

impl Invocation {
    pub fn guild_id(&self) -> Option<GuildId> {
        self.guild.as_ref().map(|g| g.id)
    }

    pub fn guild_name(&self) -> Option<&str> {
        self.guild.as_ref().map(|g| g.name.as_str())
    }

    pub async fn reply(&self, reply: BotReply) -> serenity::Result<()> {
        self.sink.reply(&self.discord, reply).await
    }

    pub async fn edit_reply(&self, reply: BotReply) -> serenity::Result<()> {
        self.sink.edit_reply(&self.discord, reply).await
    }

    pub async fn follow_up(&self, reply: BotReply) -> serenity::Result<()> {
        self.sink.follow_up(&self.discord, reply).await
    }
}
