use std::sync::Arc;

use anyhow::Context as _;
use serenity::all::{Client, ClientBuilder, GatewayIntents};

use crate::infrastructure::botdata::Data;
use crate::infrastructure::environment::{self, env_var_with_context};
use crate::infrastructure::event_handler::Handler;

pub async fn create_serenity_client(data: Arc<Data>) -> anyhow::Result<Client> {
    let token = env_var_with_context(environment::DISCORD_TOKEN)?;
    // MESSAGE_CONTENT for prefix commands and experience awards,
    // GUILD_MEMBERS to resolve member permissions from cache.
    let intents = GatewayIntents::non_privileged()
        .union(GatewayIntents::MESSAGE_CONTENT)
        .union(GatewayIntents::GUILD_MEMBERS);

    ClientBuilder::new(token, intents)
        .event_handler(Handler { data })
        .await
        .context("Failed to create serenity client")
}
