use std::collections::BTreeMap;

use serenity::all::{CommandOptionType, CreateCommandOption, CreateEmbed};
use tracing::warn;

use crate::dispatch::context::Invocation;
use crate::dispatch::registry::{CommandSpec, CommandRegistry};
use crate::dispatch::reply::BotReply;
use crate::infrastructure::colors;
use crate::services::guilds;

pub fn help() -> CommandSpec {
    CommandSpec::new("help", "List available commands or describe one", |inv| {
        Box::pin(run(inv))
    })
    .category("utility")
    .cooldown(5)
    .slash_options(|command| {
        command.add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "command",
                "The command to describe",
            )
            .required(false),
        )
    })
}

async fn run(inv: &Invocation) -> anyhow::Result<()> {
    let prefix = display_prefix(inv).await;
    if let Some(name) = inv.args.get_string("command") {
        let name = name.to_lowercase();
        let Some(spec) = inv.data.registry.lookup(&name) else {
            inv.reply(
                BotReply::new()
                    .content(format!("There is no command named `{name}`."))
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        };
        inv.reply(BotReply::new().embed(detail_embed(spec, &prefix)))
            .await?;
        return Ok(());
    }
    inv.reply(BotReply::new().embed(overview_embed(&inv.data.registry, &prefix)))
        .await?;
    Ok(())
}

/// The guild's configured prefix, or the default when invoked in DMs or
/// when the lookup fails.
async fn display_prefix(inv: &Invocation) -> String {
    let Some(guild) = &inv.guild else {
        return guilds::DEFAULT_PREFIX.to_owned();
    };
    match guilds::find_or_create(&inv.data.db, guild.id, &guild.name).await {
        Ok(record) => record.prefix,
        Err(e) => {
            warn!(guild = %guild.id, "Failed to resolve prefix for help: {e:?}");
            guilds::DEFAULT_PREFIX.to_owned()
        }
    }
}

fn detail_embed(spec: &CommandSpec, prefix: &str) -> CreateEmbed {
    let cooldown = match spec.cooldown_secs {
        Some(seconds) => format!("{seconds}s"),
        None => "None".to_owned(),
    };
    let permissions = if spec.permissions.is_empty() {
        "None".to_owned()
    } else {
        spec.permissions.to_string()
    };
    let mut embed = CreateEmbed::new()
        .title(format!("Command: {}", spec.name))
        .description(spec.description)
        .colour(colors::slate())
        .field(
            "Usage",
            format!("`/{}` or `{}{}`", spec.name, prefix, spec.name),
            false,
        )
        .field("Category", spec.category, true)
        .field("Cooldown", cooldown, true)
        .field("Required permissions", permissions, true);
    if spec.guild_only {
        embed = embed.field("Server only", "Yes", true);
    }
    if spec.owner_only {
        embed = embed.field("Owner only", "Yes", true);
    }
    embed
}

fn overview_embed(registry: &CommandRegistry, prefix: &str) -> CreateEmbed {
    let mut by_category: BTreeMap<&str, Vec<&CommandSpec>> = BTreeMap::new();
    for spec in registry.iter() {
        by_category.entry(spec.category).or_default().push(spec);
    }
    let mut embed = CreateEmbed::new()
        .title("Available commands")
        .description(format!(
            "Use `/help command` or `{prefix}help command` for details."
        ))
        .colour(colors::slate());
    for (category, mut specs) in by_category {
        specs.sort_by_key(|spec| spec.name);
        let listing = specs
            .iter()
            .map(|spec| format!("`{}` {}", spec.name, spec.description))
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field(category, listing, false);
    }
    embed
}
