//! Leveling readouts: a single user's progress and the server-wide top
//! list.

use serenity::all::{CommandOptionType, CreateCommandOption, CreateEmbed, User};

use crate::dispatch::context::Invocation;
use crate::dispatch::registry::CommandSpec;
use crate::dispatch::reply::BotReply;
use crate::entities::user::XP_PER_LEVEL;
use crate::infrastructure::colors;
use crate::services::users;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 25;

pub fn rank() -> CommandSpec {
    CommandSpec::new("rank", "Show a member's level, experience and coins", |inv| {
        Box::pin(run_rank(inv))
    })
    .category("leveling")
    .cooldown(5)
    .slash_options(|command| {
        command.add_option(
            CreateCommandOption::new(
                CommandOptionType::User,
                "user",
                "The member to look up, defaulting to you",
            )
            .required(false),
        )
    })
}

pub fn leaderboard() -> CommandSpec {
    CommandSpec::new("leaderboard", "Show the top members by level or coins", |inv| {
        Box::pin(run_leaderboard(inv))
    })
    .category("leveling")
    .cooldown(10)
    .slash_options(|command| {
        command
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "limit",
                    "How many members to list (1 to 25)",
                )
                .required(false),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Boolean,
                    "coins",
                    "Rank by coin balance instead of level",
                )
                .required(false),
            )
    })
}

async fn run_rank(inv: &Invocation) -> anyhow::Result<()> {
    let target = target_user(inv).await?;
    let record = users::find_or_create(
        &inv.data.db,
        target.id,
        &target.name,
        target.global_name.as_deref(),
    )
    .await?;
    let shown_name = record.display_name.as_deref().unwrap_or(&record.username);
    let embed = CreateEmbed::new()
        .title(format!("{shown_name} is level {}", record.level))
        .colour(colors::emerald())
        .field(
            "Progress",
            format!(
                "{}/{XP_PER_LEVEL} XP toward level {}",
                record.xp_into_level(),
                record.level + 1
            ),
            true,
        )
        .field("Total XP", record.experience.to_string(), true)
        .field("Coins", record.coins.to_string(), true);
    inv.reply(BotReply::new().embed(embed)).await?;
    Ok(())
}

async fn target_user(inv: &Invocation) -> anyhow::Result<User> {
    match inv.args.get_user("user") {
        Some(user_id) => Ok(user_id.to_user(&inv.discord).await?),
        None => Ok(inv.actor.clone()),
    }
}

async fn run_leaderboard(inv: &Invocation) -> anyhow::Result<()> {
    let limit = inv
        .args
        .get_integer("limit")
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT) as u64;
    let by_coins = inv.args.get_boolean("coins").unwrap_or(false);
    let top = users::top_users(&inv.data.db, limit, by_coins).await?;
    if top.is_empty() {
        inv.reply(BotReply::new().content("No one has earned anything yet."))
            .await?;
        return Ok(());
    }
    let lines = top
        .iter()
        .enumerate()
        .map(|(index, user)| {
            let shown = user.display_name.as_deref().unwrap_or(&user.username);
            if by_coins {
                format!("{}. **{shown}** {} coins", index + 1, user.coins)
            } else {
                format!(
                    "{}. **{shown}** level {} ({} XP)",
                    index + 1,
                    user.level,
                    user.experience
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    let title = if by_coins {
        "Top members by coins"
    } else {
        "Top members by level"
    };
    let embed = CreateEmbed::new()
        .title(title)
        .description(lines)
        .colour(colors::amber());
    inv.reply(BotReply::new().embed(embed)).await?;
    Ok(())
}
