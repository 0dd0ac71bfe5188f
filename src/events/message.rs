//! Prefix-command ingestion and message-driven experience awards.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serenity::all::{Context, Message};
use tracing::{debug, info, warn};

use crate::dispatch::args::Args;
use crate::dispatch::context::{GuildRef, Invocation};
use crate::dispatch::core::{self, Outcome};
use crate::dispatch::reply::{BotReply, ReplySink};
use crate::entities::guild;
use crate::infrastructure::botdata::Data;
use crate::services::{guilds, users};

/// Experience granted per counted message, inclusive bounds.
const XP_RANGE: std::ops::RangeInclusive<i64> = 15..=25;
/// One message per user per minute counts toward experience.
const XP_COOLDOWN: Duration = Duration::from_secs(60);
/// Cooldown key namespace for experience awards. Commands are registered
/// with lowercase single-word names, so this key can never collide.
const XP_COOLDOWN_KEY: &str = "message xp";

/// Splits a prefixed command line into the lowercased command name and its
/// raw argument tokens. Returns `None` when the message does not start with
/// the prefix or carries no command after it.
pub fn split_command_line(content: &str, prefix: &str) -> Option<(String, Vec<String>)> {
    let rest = content.strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace();
    let command = tokens.next()?.to_lowercase();
    Some((command, tokens.map(str::to_owned).collect()))
}

pub async fn on_message(ctx: &Context, data: &Arc<Data>, msg: &Message) -> anyhow::Result<()> {
    if msg.author.bot {
        return Ok(());
    }
    // Prefix commands and leveling are both guild features; DMs carry
    // neither.
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };

    // Resolve everything cache-backed before the first await; the cache
    // guard must not be held across one.
    let (guild_name, permissions) = {
        match ctx.cache.guild(guild_id) {
            Some(cached) => {
                let member_permissions = cached
                    .members
                    .get(&msg.author.id)
                    .map(|member| cached.member_permissions(member));
                (cached.name.clone(), member_permissions)
            }
            None => (String::new(), None),
        }
    };

    // A database failure degrades to the default prefix and skips the
    // experience award; command traffic keeps flowing.
    let record = match guilds::find_or_create(&data.db, guild_id, &guild_name).await {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(guild = %guild_id, "Failed to load guild record: {e:?}");
            None
        }
    };
    let prefix = record
        .as_ref()
        .map(|r| r.prefix.as_str())
        .unwrap_or(guilds::DEFAULT_PREFIX);

    let Some((command, tokens)) = split_command_line(&msg.content, prefix) else {
        if let Some(record) = &record {
            award_message_xp(ctx, data, msg, record).await;
        }
        return Ok(());
    };

    if let Some(record) = &record
        && record.is_command_disabled(&command)
    {
        debug!(guild = %guild_id, command, "Ignoring disabled command");
        return Ok(());
    }

    let inv = Invocation {
        discord: ctx.clone(),
        data: Arc::clone(data),
        actor: msg.author.clone(),
        guild: Some(GuildRef {
            id: guild_id,
            name: guild_name,
        }),
        permissions,
        command,
        args: Args::Positional(tokens),
        sink: ReplySink::for_message(msg.clone()),
    };

    match core::dispatch(&inv).await {
        Outcome::Executed => {
            info!(command = %inv.command, actor = %inv.actor.id, guild = %guild_id,
                "Executed prefix command");
        }
        Outcome::Rejected(rejection) => {
            inv.reply(BotReply::new().content(rejection.to_string()))
                .await?;
        }
        // Ordinary chat that happens to start with the prefix; stay silent.
        Outcome::NotFound => {
            debug!(command = %inv.command, "Unknown prefix command");
        }
    }
    Ok(())
}

/// Awards experience for a counted message and announces level-ups. At most
/// one message per user per minute counts; the award itself is best-effort.
async fn award_message_xp(ctx: &Context, data: &Arc<Data>, msg: &Message, record: &guild::Model) {
    if !record.leveling_enabled() {
        return;
    }
    if data.cooldowns.check(msg.author.id, XP_COOLDOWN_KEY, XP_COOLDOWN) > 0 {
        return;
    }

    let amount = rand::rng().random_range(XP_RANGE);
    let result = users::add_experience(
        &data.db,
        msg.author.id,
        &msg.author.name,
        msg.author.global_name.as_deref(),
        amount,
    )
    .await;
    let level_up = match result {
        Ok((_, level_up)) => level_up,
        Err(e) => {
            warn!(actor = %msg.author.id, "Failed to award experience: {e:?}");
            return;
        }
    };

    let Some(level_up) = level_up else {
        return;
    };
    let payout = i64::from(level_up.new_level) * users::COINS_PER_LEVEL;
    if let Err(e) = users::add_coins(&data.db, msg.author.id, payout).await {
        warn!(actor = %msg.author.id, "Failed to pay out level-up coins: {e:?}");
    }
    info!(actor = %msg.author.id, level = level_up.new_level, "User leveled up");
    let announcement = format!(
        "Congratulations {}! You reached level {} and earned {} coins!",
        msg.author, level_up.new_level, payout
    );
    if let Err(e) = msg.channel_id.say(&ctx.http, announcement).await {
        warn!(channel = %msg.channel_id, "Failed to announce level-up: {e:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_lines_split_on_whitespace_and_lowercase_the_name() {
        let (command, tokens) = split_command_line("!  PING   now", "!").unwrap();
        assert_eq!(command, "ping");
        assert_eq!(tokens, vec!["now".to_owned()]);
    }

    #[test]
    fn custom_prefixes_are_honored() {
        let (command, tokens) = split_command_line("?prefix set %", "?").unwrap();
        assert_eq!(command, "prefix");
        assert_eq!(tokens, vec!["set".to_owned(), "%".to_owned()]);
    }

    #[test]
    fn non_prefixed_messages_are_not_commands() {
        assert!(split_command_line("hello there", "!").is_none());
        assert!(split_command_line("?ping", "!").is_none());
    }

    #[test]
    fn a_bare_prefix_is_not_a_command() {
        assert!(split_command_line("!", "!").is_none());
        assert!(split_command_line("!   ", "!").is_none());
    }

    #[test]
    fn multi_character_prefixes_strip_whole() {
        let (command, tokens) = split_command_line("bot! rank", "bot!").unwrap();
        assert_eq!(command, "rank");
        assert!(tokens.is_empty());
    }
}
