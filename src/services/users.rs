//! User leveling and coin balances. Experience is awarded by the message
//! listener; level is derived from total experience and stored denormalized
//! so leaderboard queries stay a single ordered select.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serenity::all::UserId;
use tracing::info;

use crate::entities::user::{self, Entity as User, level_for};

/// Crossing a level boundary pays out coins; the multiplier is applied to
/// the level just reached.
pub const COINS_PER_LEVEL: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub new_level: i32,
}

pub async fn find_or_create(
    db: &DatabaseConnection,
    user_id: UserId,
    username: &str,
    display_name: Option<&str>,
) -> anyhow::Result<user::Model> {
    let discord_id = user_id.to_string();
    if let Some(existing) = User::find()
        .filter(user::Column::DiscordId.eq(discord_id.as_str()))
        .one(db)
        .await?
    {
        if existing.username != username
            || existing.display_name.as_deref() != display_name
        {
            let mut active: user::ActiveModel = existing.into();
            active.username = Set(username.to_owned());
            active.display_name = Set(display_name.map(str::to_owned));
            active.updated_at = Set(Utc::now());
            return Ok(active.update(db).await?);
        }
        return Ok(existing);
    }

    let now = Utc::now();
    let created = user::ActiveModel {
        discord_id: Set(discord_id.clone()),
        username: Set(username.to_owned()),
        display_name: Set(display_name.map(str::to_owned)),
        level: Set(0),
        experience: Set(0),
        coins: Set(0),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created new user: {} ({})", created.username, discord_id);
    Ok(created)
}

/// Adds experience and recomputes the stored level. Returns the updated
/// record plus a [`LevelUp`] when a level boundary was crossed.
pub async fn add_experience(
    db: &DatabaseConnection,
    user_id: UserId,
    username: &str,
    display_name: Option<&str>,
    amount: i64,
) -> anyhow::Result<(user::Model, Option<LevelUp>)> {
    let existing = find_or_create(db, user_id, username, display_name).await?;
    let previous_level = existing.level;
    let experience = existing.experience + amount;
    let level = level_for(experience);
    let mut active: user::ActiveModel = existing.into();
    active.experience = Set(experience);
    active.level = Set(level);
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;
    let level_up = (level > previous_level).then_some(LevelUp { new_level: level });
    Ok((updated, level_up))
}

/// Adjusts a user's coin balance. The user must already exist; coins are
/// only ever granted to users the leveling path has seen.
pub async fn add_coins(
    db: &DatabaseConnection,
    user_id: UserId,
    amount: i64,
) -> anyhow::Result<user::Model> {
    let discord_id = user_id.to_string();
    let Some(existing) = User::find()
        .filter(user::Column::DiscordId.eq(discord_id.as_str()))
        .one(db)
        .await?
    else {
        anyhow::bail!("Cannot adjust coins for unknown user {discord_id}");
    };
    let coins = existing.coins + amount;
    let mut active: user::ActiveModel = existing.into();
    active.coins = Set(coins);
    active.updated_at = Set(Utc::now());
    Ok(active.update(db).await?)
}

/// Top active users, ordered by level then experience, or by coin balance
/// when `by_coins` is set.
pub async fn top_users(
    db: &DatabaseConnection,
    limit: u64,
    by_coins: bool,
) -> anyhow::Result<Vec<user::Model>> {
    let query = User::find().filter(user::Column::IsActive.eq(true));
    let query = if by_coins {
        query.order_by_desc(user::Column::Coins)
    } else {
        query
            .order_by_desc(user::Column::Level)
            .order_by_desc(user::Column::Experience)
    };
    Ok(query.limit(limit).all(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_connection;

    const ALICE: UserId = UserId::new(100);
    const BOB: UserId = UserId::new(200);

    #[tokio::test]
    async fn find_or_create_is_idempotent() {
        let db = test_connection().await;
        let first = find_or_create(&db, ALICE, "alice", None).await.unwrap();
        let second = find_or_create(&db, ALICE, "alice", None).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.level, 0);
        assert_eq!(second.coins, 0);
    }

    #[tokio::test]
    async fn username_changes_are_written_back() {
        let db = test_connection().await;
        find_or_create(&db, ALICE, "alice", None).await.unwrap();
        let renamed = find_or_create(&db, ALICE, "alice2", Some("Alice"))
            .await
            .unwrap();
        assert_eq!(renamed.username, "alice2");
        assert_eq!(renamed.display_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn experience_accumulates_and_levels_are_derived() {
        let db = test_connection().await;
        let (user, level_up) = add_experience(&db, ALICE, "alice", None, 60).await.unwrap();
        assert_eq!(user.experience, 60);
        assert_eq!(user.level, 0);
        assert!(level_up.is_none());

        let (user, level_up) = add_experience(&db, ALICE, "alice", None, 60).await.unwrap();
        assert_eq!(user.experience, 120);
        assert_eq!(user.level, 1);
        assert_eq!(level_up, Some(LevelUp { new_level: 1 }));
    }

    #[tokio::test]
    async fn a_large_grant_reports_the_final_level_once() {
        let db = test_connection().await;
        let (user, level_up) = add_experience(&db, ALICE, "alice", None, 250).await.unwrap();
        assert_eq!(user.level, 2);
        assert_eq!(level_up, Some(LevelUp { new_level: 2 }));
    }

    #[tokio::test]
    async fn coins_require_an_existing_user() {
        let db = test_connection().await;
        assert!(add_coins(&db, ALICE, 50).await.is_err());
        find_or_create(&db, ALICE, "alice", None).await.unwrap();
        let user = add_coins(&db, ALICE, 50).await.unwrap();
        assert_eq!(user.coins, 50);
    }

    #[tokio::test]
    async fn leaderboard_orders_by_level_then_experience_or_by_coins() {
        let db = test_connection().await;
        add_experience(&db, ALICE, "alice", None, 250).await.unwrap();
        add_experience(&db, BOB, "bob", None, 120).await.unwrap();
        add_coins(&db, BOB, 500).await.unwrap();

        let by_level = top_users(&db, 10, false).await.unwrap();
        assert_eq!(by_level[0].username, "alice");

        let by_coins = top_users(&db, 10, true).await.unwrap();
        assert_eq!(by_coins[0].username, "bob");

        let capped = top_users(&db, 1, false).await.unwrap();
        assert_eq!(capped.len(), 1);
    }
}
