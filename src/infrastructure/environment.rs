use std::path::PathBuf;

use anyhow::Context;
use serenity::all::{GuildId, UserId};
use tracing::warn;

use crate::infrastructure::botdata::ShardInfo;

macro_rules! const_str {
    ($name:ident) => {
        pub const $name: &str = stringify!($name);
    };
}

const_str!(DISCORD_TOKEN);
const_str!(DATABASE_URL);
const_str!(DATA_DIRECTORY);
const_str!(OWNER_ID);
const_str!(GUILD_ID);
const_str!(SHARD_ID);
const_str!(TOTAL_SHARDS);
const_str!(COMMAND_DISABLE_LIST);
const_str!(LOG_DIRECTORY);

pub fn env_var_with_context(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("missing environment variable {name}"))
}

pub fn get_data_directory() -> PathBuf {
    std::env::var(DATA_DIRECTORY)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data"))
}

/// The configured bot owner, if any. An unset or unparseable `OWNER_ID`
/// means no owner-only command can ever pass its gate.
pub fn owner_id() -> Option<UserId> {
    let value = std::env::var(OWNER_ID).ok()?;
    match value.trim().parse::<u64>() {
        Ok(id) => Some(UserId::new(id)),
        Err(e) => {
            warn!("Invalid UserId in {}: {}", OWNER_ID, e);
            None
        }
    }
}

/// Guild to scope slash-command registration to during development.
pub fn registration_guild() -> Option<GuildId> {
    let value = std::env::var(GUILD_ID).ok()?;
    match value.trim().parse::<u64>() {
        Ok(id) => Some(GuildId::new(id)),
        Err(e) => {
            warn!("Invalid GuildId in {}: {}", GUILD_ID, e);
            None
        }
    }
}

/// Shard assignment handed down by the external sharding layer. Absent or
/// malformed variables fall back to a single unsharded process.
pub fn shard_info() -> ShardInfo {
    let parse = |name: &str| {
        std::env::var(name)
            .ok()
            .and_then(|value| match value.trim().parse::<u32>() {
                Ok(n) => Some(n),
                Err(e) => {
                    warn!("Invalid value in {}: {}", name, e);
                    None
                }
            })
    };
    match (parse(SHARD_ID), parse(TOTAL_SHARDS)) {
        (Some(id), Some(total)) if total > 0 && id < total => ShardInfo { id, total },
        (None, None) => ShardInfo::single(),
        _ => {
            warn!(
                "{} and {} must both be set and consistent; running unsharded",
                SHARD_ID, TOTAL_SHARDS
            );
            ShardInfo::single()
        }
    }
}
