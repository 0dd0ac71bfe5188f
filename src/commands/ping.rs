use std::time::{Duration, Instant};

use crate::dispatch::context::Invocation;
use crate::dispatch::registry::CommandSpec;
use crate::dispatch::reply::BotReply;

pub fn ping() -> CommandSpec {
    CommandSpec::new("ping", "Check the bot's response time", |inv| {
        Box::pin(run(inv))
    })
    .category("utility")
    .cooldown(3)
}

async fn run(inv: &Invocation) -> anyhow::Result<()> {
    let started = Instant::now();
    inv.reply(BotReply::new().content("Pinging...")).await?;
    let roundtrip = started.elapsed().as_millis();
    let content = match gateway_latency(inv).await {
        Some(latency) => format!(
            "Pong! Roundtrip: {roundtrip}ms. Gateway: {}ms.",
            latency.as_millis()
        ),
        None => format!("Pong! Roundtrip: {roundtrip}ms."),
    };
    inv.edit_reply(BotReply::new().content(content)).await?;
    Ok(())
}

/// Heartbeat latency of the shard this event arrived on. Absent until the
/// first heartbeat acknowledgement comes back.
async fn gateway_latency(inv: &Invocation) -> Option<Duration> {
    let manager = inv.data.shard_manager.get()?;
    let runners = manager.runners.lock().await;
    runners
        .get(&inv.discord.shard_id)
        .and_then(|runner| runner.latency)
}
