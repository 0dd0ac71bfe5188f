use serenity::all::CreateEmbed;

use crate::dispatch::context::Invocation;
use crate::dispatch::registry::CommandSpec;
use crate::dispatch::reply::BotReply;
use crate::infrastructure::colors;
use crate::infrastructure::util::format_uptime;

pub fn shards() -> CommandSpec {
    CommandSpec::new("shards", "Show gateway shard status", |inv| {
        Box::pin(run(inv))
    })
    .category("utility")
    .cooldown(10)
    .owner_only()
}

async fn run(inv: &Invocation) -> anyhow::Result<()> {
    let mut embed = CreateEmbed::new()
        .title("Shard status")
        .colour(colors::slate())
        .field(
            "Process shard",
            format!("{} of {}", inv.data.shard.id, inv.data.shard.total),
            true,
        )
        .field(
            "Process uptime",
            format_uptime(inv.data.started_at.elapsed()),
            true,
        );

    if let Some(manager) = inv.data.shard_manager.get() {
        let runners = manager.runners.lock().await;
        for (shard_id, runner) in runners.iter() {
            let latency = match runner.latency {
                Some(latency) => format!("{}ms", latency.as_millis()),
                None => "n/a".to_owned(),
            };
            embed = embed.field(
                format!("Shard {shard_id}"),
                format!("{} (latency {latency})", runner.stage),
                false,
            );
        }
    }

    inv.reply(BotReply::new().embed(embed).ephemeral(true)).await?;
    Ok(())
}
