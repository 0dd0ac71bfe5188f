use serenity::all::{CommandOptionType, CreateCommandOption, Permissions};

use crate::dispatch::context::Invocation;
use crate::dispatch::registry::CommandSpec;
use crate::dispatch::reply::BotReply;
use crate::services::guilds;

const MAX_PREFIX_LEN: usize = 5;

pub fn prefix() -> CommandSpec {
    CommandSpec::new("prefix", "Show or change this server's command prefix", |inv| {
        Box::pin(run(inv))
    })
    .category("admin")
    .cooldown(5)
    .guild_only()
    .permissions(Permissions::MANAGE_GUILD)
    .slash_options(|command| {
        command
            .add_option(CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "show",
                "Show the current command prefix",
            ))
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "set",
                    "Set a new command prefix",
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "new_prefix",
                        "The new prefix, at most 5 characters",
                    )
                    .required(true)
                    .max_length(MAX_PREFIX_LEN as u16),
                ),
            )
    })
}

async fn run(inv: &Invocation) -> anyhow::Result<()> {
    let Some(guild) = &inv.guild else {
        anyhow::bail!("prefix command invoked outside a guild");
    };

    if inv.args.subcommand().as_deref() == Some("set") {
        let Some(new_prefix) = inv.args.get_string("new_prefix") else {
            inv.reply(
                BotReply::new()
                    .content("Please provide the new prefix.")
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        };
        if new_prefix.is_empty()
            || new_prefix.len() > MAX_PREFIX_LEN
            || new_prefix.chars().any(char::is_whitespace)
        {
            inv.reply(
                BotReply::new()
                    .content(format!(
                        "The prefix must be 1 to {MAX_PREFIX_LEN} characters with no spaces."
                    ))
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
        let updated = guilds::update_prefix(&inv.data.db, guild.id, &guild.name, &new_prefix).await?;
        inv.reply(
            BotReply::new().content(format!("The command prefix is now `{}`.", updated.prefix)),
        )
        .await?;
        return Ok(());
    }

    // `show`, or no subcommand on the prefix path.
    let record = guilds::find_or_create(&inv.data.db, guild.id, &guild.name).await?;
    inv.reply(BotReply::new().content(format!(
        "The current command prefix is `{}`.",
        record.prefix
    )))
    .await?;
    Ok(())
}
