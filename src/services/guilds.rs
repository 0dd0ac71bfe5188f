//! Guild configuration access. `find_or_create` is the prefix resolver for
//! the dispatch path: idempotent and safe to call on every message.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serenity::all::GuildId;
use tracing::{debug, info};

use crate::entities::guild::{self, Entity as Guild};

pub const DEFAULT_PREFIX: &str = "!";

/// Fetches the guild's configuration, creating a default record (prefix
/// `"!"`, nothing disabled) on first contact. A changed guild name is
/// written back opportunistically.
pub async fn find_or_create(
    db: &DatabaseConnection,
    guild_id: GuildId,
    name: &str,
) -> anyhow::Result<guild::Model> {
    let discord_id = guild_id.to_string();
    if let Some(existing) = Guild::find()
        .filter(guild::Column::DiscordId.eq(discord_id.as_str()))
        .one(db)
        .await?
    {
        if !name.is_empty() && existing.name != name {
            let mut active: guild::ActiveModel = existing.into();
            active.name = Set(name.to_owned());
            active.updated_at = Set(Utc::now());
            let updated = active.update(db).await?;
            debug!("Updated guild name: {} ({})", updated.name, discord_id);
            return Ok(updated);
        }
        return Ok(existing);
    }

    let now = Utc::now();
    let created = guild::ActiveModel {
        discord_id: Set(discord_id.clone()),
        name: Set(name.to_owned()),
        prefix: Set(DEFAULT_PREFIX.to_owned()),
        is_active: Set(true),
        settings: Set(None),
        disabled_commands: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created new guild: {} ({})", created.name, discord_id);
    Ok(created)
}

pub async fn update_prefix(
    db: &DatabaseConnection,
    guild_id: GuildId,
    name: &str,
    prefix: &str,
) -> anyhow::Result<guild::Model> {
    let existing = find_or_create(db, guild_id, name).await?;
    let mut active: guild::ActiveModel = existing.into();
    active.prefix = Set(prefix.to_owned());
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;
    info!("Updated prefix for guild {}: {}", updated.name, prefix);
    Ok(updated)
}

/// Adds or removes one command from the guild's disabled set.
pub async fn set_command_disabled(
    db: &DatabaseConnection,
    guild_id: GuildId,
    name: &str,
    command: &str,
    disabled: bool,
) -> anyhow::Result<guild::Model> {
    let existing = find_or_create(db, guild_id, name).await?;
    let mut commands = existing.disabled();
    if disabled {
        if !commands.iter().any(|c| c == command) {
            commands.push(command.to_owned());
        }
    } else {
        commands.retain(|c| c != command);
    }
    let mut active: guild::ActiveModel = existing.into();
    active.disabled_commands = Set(Some(serde_json::Value::Array(
        commands.into_iter().map(serde_json::Value::String).collect(),
    )));
    active.updated_at = Set(Utc::now());
    Ok(active.update(db).await?)
}

pub async fn set_setting(
    db: &DatabaseConnection,
    guild_id: GuildId,
    name: &str,
    key: &str,
    value: serde_json::Value,
) -> anyhow::Result<guild::Model> {
    let existing = find_or_create(db, guild_id, name).await?;
    let mut settings = match existing.settings.clone() {
        Some(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    settings.insert(key.to_owned(), value);
    let mut active: guild::ActiveModel = existing.into();
    active.settings = Set(Some(serde_json::Value::Object(settings)));
    active.updated_at = Set(Utc::now());
    Ok(active.update(db).await?)
}

/// Marks a guild the bot left as inactive; the record is kept, never
/// deleted.
pub async fn set_inactive(db: &DatabaseConnection, guild_id: GuildId) -> anyhow::Result<()> {
    let discord_id = guild_id.to_string();
    let Some(existing) = Guild::find()
        .filter(guild::Column::DiscordId.eq(discord_id.as_str()))
        .one(db)
        .await?
    else {
        return Ok(());
    };
    let name = existing.name.clone();
    let mut active: guild::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now());
    active.update(db).await?;
    info!("Set guild {} as inactive", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_connection;

    const GUILD: GuildId = GuildId::new(9001);

    #[tokio::test]
    async fn find_or_create_is_idempotent() {
        let db = test_connection().await;
        let first = find_or_create(&db, GUILD, "test guild").await.unwrap();
        let second = find_or_create(&db, GUILD, "test guild").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.prefix, DEFAULT_PREFIX);
        assert!(second.is_active);
    }

    #[tokio::test]
    async fn guild_name_changes_are_written_back() {
        let db = test_connection().await;
        find_or_create(&db, GUILD, "old name").await.unwrap();
        let renamed = find_or_create(&db, GUILD, "new name").await.unwrap();
        assert_eq!(renamed.name, "new name");
    }

    #[tokio::test]
    async fn prefix_updates_persist() {
        let db = test_connection().await;
        update_prefix(&db, GUILD, "test guild", "?").await.unwrap();
        let reloaded = find_or_create(&db, GUILD, "test guild").await.unwrap();
        assert_eq!(reloaded.prefix, "?");
    }

    #[tokio::test]
    async fn commands_toggle_in_and_out_of_the_disabled_set() {
        let db = test_connection().await;
        let disabled = set_command_disabled(&db, GUILD, "test guild", "ping", true)
            .await
            .unwrap();
        assert!(disabled.is_command_disabled("ping"));
        // Disabling twice keeps a single entry.
        let again = set_command_disabled(&db, GUILD, "test guild", "ping", true)
            .await
            .unwrap();
        assert_eq!(again.disabled(), vec!["ping".to_owned()]);
        let enabled = set_command_disabled(&db, GUILD, "test guild", "ping", false)
            .await
            .unwrap();
        assert!(!enabled.is_command_disabled("ping"));
    }

    #[tokio::test]
    async fn settings_merge_rather_than_replace() {
        let db = test_connection().await;
        set_setting(&db, GUILD, "g", "levelingEnabled", serde_json::Value::Bool(false))
            .await
            .unwrap();
        let updated = set_setting(
            &db,
            GUILD,
            "g",
            "logChannel",
            serde_json::Value::String("123".into()),
        )
        .await
        .unwrap();
        assert!(!updated.leveling_enabled());
        assert_eq!(
            updated.setting("logChannel").and_then(|v| v.as_str()),
            Some("123")
        );
    }

    #[tokio::test]
    async fn departed_guilds_are_marked_inactive() {
        let db = test_connection().await;
        find_or_create(&db, GUILD, "test guild").await.unwrap();
        set_inactive(&db, GUILD).await.unwrap();
        let reloaded = find_or_create(&db, GUILD, "test guild").await.unwrap();
        assert!(!reloaded.is_active);
        // Unknown guilds are a no-op, not an error.
        set_inactive(&db, GuildId::new(4242)).await.unwrap();
    }
}
