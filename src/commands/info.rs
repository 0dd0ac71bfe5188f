use serenity::all::CreateEmbed;

use crate::dispatch::context::Invocation;
use crate::dispatch::registry::CommandSpec;
use crate::dispatch::reply::BotReply;
use crate::infrastructure::colors;
use crate::infrastructure::util::format_uptime;

pub fn info() -> CommandSpec {
    CommandSpec::new("info", "Show bot statistics", |inv| Box::pin(run(inv)))
        .category("utility")
        .cooldown(5)
}

async fn run(inv: &Invocation) -> anyhow::Result<()> {
    let cache = &inv.discord.cache;
    let servers = cache.guild_count();
    let members: u64 = cache
        .guilds()
        .into_iter()
        .filter_map(|id| cache.guild(id).map(|guild| guild.member_count))
        .sum();
    let embed = CreateEmbed::new()
        .title("Bot information")
        .colour(colors::slate())
        .field("Servers", servers.to_string(), true)
        .field("Members", members.to_string(), true)
        .field("Commands", inv.data.registry.len().to_string(), true)
        .field(
            "Shard",
            format!("{}/{}", inv.data.shard.id, inv.data.shard.total),
            true,
        )
        .field("Uptime", format_uptime(inv.data.started_at.elapsed()), true)
        .field("Version", env!("CARGO_PKG_VERSION"), true);
    inv.reply(BotReply::new().embed(embed)).await?;
    Ok(())
}
