use std::sync::{Arc, OnceLock};
use std::time::Instant;

use sea_orm::DatabaseConnection;
use serenity::all::UserId;
use serenity::gateway::ShardManager;

use crate::dispatch::cooldown::CooldownTracker;
use crate::dispatch::registry::CommandRegistry;

/// Shard assignment for this process. Defaults to a single unsharded
/// process when the sharding layer provides nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardInfo {
    pub id: u32,
    pub total: u32,
}

impl ShardInfo {
    pub fn single() -> Self {
        Self { id: 0, total: 1 }
    }

    pub fn is_sharded(&self) -> bool {
        self.total > 1
    }
}

/// Process-wide state shared by every in-flight event handler. The registry
/// is immutable after load; the cooldown tracker synchronizes internally.
/// Both are per-shard by design: a user's traffic is pinned to one shard by
/// the external sharding layer.
pub struct Data {
    pub db: DatabaseConnection,
    pub registry: CommandRegistry,
    pub cooldowns: CooldownTracker,
    pub owner: Option<UserId>,
    pub shard: ShardInfo,
    pub started_at: Instant,
    /// Set once by `main` after the client is built; used for gateway
    /// latency readouts in `ping` and `shards`.
    pub shard_manager: OnceLock<Arc<ShardManager>>,
}
