//! Per-guild administration: toggling commands and the leveling system.

use serenity::all::{CommandOptionType, CreateCommandOption, Permissions};

use crate::dispatch::context::Invocation;
use crate::dispatch::registry::CommandSpec;
use crate::dispatch::reply::BotReply;
use crate::services::guilds;

pub fn enable() -> CommandSpec {
    CommandSpec::new("enable", "Re-enable a command in this server", |inv| {
        Box::pin(toggle(inv, false))
    })
    .category("admin")
    .cooldown(5)
    .guild_only()
    .permissions(Permissions::MANAGE_GUILD)
    .slash_options(command_name_option)
}

pub fn disable() -> CommandSpec {
    CommandSpec::new("disable", "Disable a command in this server", |inv| {
        Box::pin(toggle(inv, true))
    })
    .category("admin")
    .cooldown(5)
    .guild_only()
    .permissions(Permissions::MANAGE_GUILD)
    .slash_options(command_name_option)
}

pub fn leveling() -> CommandSpec {
    CommandSpec::new("leveling", "Turn the leveling system on or off", |inv| {
        Box::pin(set_leveling(inv))
    })
    .category("admin")
    .cooldown(5)
    .guild_only()
    .permissions(Permissions::MANAGE_GUILD)
    .slash_options(|command| {
        command.add_option(
            CreateCommandOption::new(
                CommandOptionType::Boolean,
                "enabled",
                "Whether members earn experience from messages",
            )
            .required(true),
        )
    })
}

fn command_name_option(
    command: serenity::all::CreateCommand,
) -> serenity::all::CreateCommand {
    command.add_option(
        CreateCommandOption::new(CommandOptionType::String, "command", "The command to toggle")
            .required(true),
    )
}

async fn toggle(inv: &Invocation, disabled: bool) -> anyhow::Result<()> {
    let Some(guild) = &inv.guild else {
        anyhow::bail!("command toggle invoked outside a guild");
    };
    let Some(name) = inv.args.get_string("command") else {
        inv.reply(
            BotReply::new()
                .content("Please name the command to toggle.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };
    let name = name.to_lowercase();
    if inv.data.registry.lookup(&name).is_none() {
        inv.reply(
            BotReply::new()
                .content(format!("There is no command named `{name}`."))
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }
    guilds::set_command_disabled(&inv.data.db, guild.id, &guild.name, &name, disabled).await?;
    let verb = if disabled { "disabled" } else { "enabled" };
    inv.reply(BotReply::new().content(format!("The `{name}` command is now {verb} in this server.")))
        .await?;
    Ok(())
}

async fn set_leveling(inv: &Invocation) -> anyhow::Result<()> {
    let Some(guild) = &inv.guild else {
        anyhow::bail!("leveling toggle invoked outside a guild");
    };
    let Some(enabled) = inv.args.get_boolean("enabled") else {
        inv.reply(
            BotReply::new()
                .content("Please specify whether leveling should be enabled.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };
    guilds::set_setting(
        &inv.data.db,
        guild.id,
        &guild.name,
        "levelingEnabled",
        serde_json::Value::Bool(enabled),
    )
    .await?;
    let state = if enabled { "enabled" } else { "disabled" };
    inv.reply(BotReply::new().content(format!("Leveling is now {state} in this server.")))
        .await?;
    Ok(())
}
