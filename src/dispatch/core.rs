use std::time::Duration;

use serenity::all::{Permissions, UserId};
use thiserror::Error;
use tracing::{error, warn};

use crate::dispatch::context::Invocation;
use crate::dispatch::cooldown::CooldownTracker;
use crate::dispatch::registry::{CommandRegistry, CommandSpec};
use crate::dispatch::reply::BotReply;

/// User-facing rejection reasons. The `Display` text is what the ingestion
/// adapters send back to the actor; rejections are replies, not error logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("This command can only be used in a server!")]
    NotInGuild,
    #[error("This command can only be used by the bot owner!")]
    NotOwner,
    #[error("You do not have permission to use this command!")]
    MissingPermission,
    #[error("Please wait {0} seconds before using this command again.")]
    OnCooldown(u64),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Executed,
    Rejected(Rejection),
    NotFound,
}

/// Everything the gate sequence reads, detached from the live invocation so
/// the gates stay a pure function over plain data.
pub struct GateContext<'a> {
    pub actor: UserId,
    pub in_guild: bool,
    pub permissions: Option<Permissions>,
    pub owner: Option<UserId>,
    pub cooldowns: &'a CooldownTracker,
}

/// The fixed gate sequence: guild-only, then owner-only, then permissions,
/// then cooldown. The first failing gate determines the rejection and
/// short-circuits, so a blocked invocation never consumes a cooldown slot.
pub fn check_gates(spec: &CommandSpec, gate: &GateContext<'_>) -> Result<(), Rejection> {
    if spec.guild_only && !gate.in_guild {
        return Err(Rejection::NotInGuild);
    }
    // Owner unset means no one qualifies.
    if spec.owner_only && gate.owner != Some(gate.actor) {
        return Err(Rejection::NotOwner);
    }
    if !spec.permissions.is_empty() && gate.in_guild {
        let effective = gate.permissions.unwrap_or_else(Permissions::empty);
        if !effective.contains(spec.permissions) {
            return Err(Rejection::MissingPermission);
        }
    }
    if let Some(seconds) = spec.cooldown_secs {
        let remaining = gate
            .cooldowns
            .check(gate.actor, spec.name, Duration::from_secs(seconds));
        if remaining > 0 {
            return Err(Rejection::OnCooldown(remaining));
        }
    }
    Ok(())
}

/// Resolves the command and runs the gates. An unresolved name never
/// reaches the gates, so no cooldown entry is created for it.
pub fn resolve_and_gate<'r>(
    registry: &'r CommandRegistry,
    name: &str,
    gate: &GateContext<'_>,
) -> Result<&'r CommandSpec, Outcome> {
    let Some(spec) = registry.lookup(name) else {
        return Err(Outcome::NotFound);
    };
    check_gates(spec, gate).map_err(Outcome::Rejected)?;
    Ok(spec)
}

/// Applies the gate sequence and invokes the resolved handler exactly once.
/// Handler errors are logged with full correlation and converted into one
/// best-effort reply; they never propagate out of the dispatch loop.
pub async fn dispatch(inv: &Invocation) -> Outcome {
    let gate = GateContext {
        actor: inv.actor.id,
        in_guild: inv.guild.is_some(),
        permissions: inv.permissions,
        owner: inv.data.owner,
        cooldowns: &inv.data.cooldowns,
    };
    let spec = match resolve_and_gate(&inv.data.registry, &inv.command, &gate) {
        Ok(spec) => spec,
        Err(outcome) => return outcome,
    };
    if let Err(e) = (spec.handler)(inv).await {
        error!(
            command = spec.name,
            actor = %inv.actor.id,
            guild = ?inv.guild_id(),
            "Command handler failed: {e:?}"
        );
        report_handler_failure(inv).await;
    }
    Outcome::Executed
}

async fn report_handler_failure(inv: &Invocation) {
    let notice = BotReply::new()
        .content("There was an error while executing this command!")
        .ephemeral(true);
    let result = if inv.sink.has_replied().await {
        inv.follow_up(notice).await
    } else {
        inv.reply(notice).await
    };
    if let Err(e) = result {
        warn!(
            command = %inv.command,
            actor = %inv.actor.id,
            "Failed to deliver the error notice: {e:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::registry::CommandFuture;

    fn noop(_inv: &Invocation) -> CommandFuture<'_> {
        Box::pin(async { Ok(()) })
    }

    const ACTOR: UserId = UserId::new(42);
    const OWNER: UserId = UserId::new(7);

    fn gate<'a>(cooldowns: &'a CooldownTracker) -> GateContext<'a> {
        GateContext {
            actor: ACTOR,
            in_guild: true,
            permissions: Some(Permissions::all()),
            owner: Some(OWNER),
            cooldowns,
        }
    }

    #[test]
    fn guild_only_rejects_before_owner_is_evaluated() {
        let cooldowns = CooldownTracker::new();
        let spec = CommandSpec::new("locked", "test", noop)
            .guild_only()
            .owner_only()
            .cooldown(10);
        let gate = GateContext {
            in_guild: false,
            owner: None,
            ..gate(&cooldowns)
        };
        assert_eq!(check_gates(&spec, &gate), Err(Rejection::NotInGuild));
        // Short-circuit: the later gates never ran, so nothing was armed.
        assert!(!cooldowns.is_armed(ACTOR, "locked"));
    }

    #[test]
    fn owner_unset_rejects_every_actor() {
        let cooldowns = CooldownTracker::new();
        let spec = CommandSpec::new("shards", "test", noop).owner_only();
        let gate = GateContext {
            owner: None,
            ..gate(&cooldowns)
        };
        assert_eq!(check_gates(&spec, &gate), Err(Rejection::NotOwner));
        let gate = GateContext {
            actor: OWNER,
            owner: None,
            ..gate
        };
        assert_eq!(check_gates(&spec, &gate), Err(Rejection::NotOwner));
    }

    #[test]
    fn owner_match_passes_the_owner_gate() {
        let cooldowns = CooldownTracker::new();
        let spec = CommandSpec::new("shards", "test", noop).owner_only();
        let gate = GateContext {
            actor: OWNER,
            ..gate(&cooldowns)
        };
        assert_eq!(check_gates(&spec, &gate), Ok(()));
    }

    #[test]
    fn permission_gate_only_applies_inside_guilds() {
        let cooldowns = CooldownTracker::new();
        let spec =
            CommandSpec::new("prefix", "test", noop).permissions(Permissions::MANAGE_GUILD);
        let dm = GateContext {
            in_guild: false,
            permissions: None,
            ..gate(&cooldowns)
        };
        assert_eq!(check_gates(&spec, &dm), Ok(()));
        let unprivileged = GateContext {
            permissions: Some(Permissions::SEND_MESSAGES),
            ..gate(&cooldowns)
        };
        assert_eq!(
            check_gates(&spec, &unprivileged),
            Err(Rejection::MissingPermission)
        );
    }

    #[test]
    fn unknown_permissions_in_guild_count_as_empty() {
        let cooldowns = CooldownTracker::new();
        let spec =
            CommandSpec::new("prefix", "test", noop).permissions(Permissions::MANAGE_GUILD);
        let gate = GateContext {
            permissions: None,
            ..gate(&cooldowns)
        };
        assert_eq!(check_gates(&spec, &gate), Err(Rejection::MissingPermission));
    }

    #[test]
    fn cooldown_gate_rejects_the_second_attempt() {
        let cooldowns = CooldownTracker::new();
        let spec = CommandSpec::new("ping", "test", noop).cooldown(3);
        assert_eq!(check_gates(&spec, &gate(&cooldowns)), Ok(()));
        match check_gates(&spec, &gate(&cooldowns)) {
            Err(Rejection::OnCooldown(remaining)) => {
                assert!(remaining > 0 && remaining <= 3);
            }
            other => panic!("expected cooldown rejection, got {other:?}"),
        }
    }

    #[test]
    fn unresolved_names_never_touch_the_cooldown_tracker() {
        let registry = crate::dispatch::registry::CommandRegistry::load(vec![
            CommandSpec::new("ping", "test", noop).cooldown(3),
        ]);
        let cooldowns = CooldownTracker::new();
        let gate = gate(&cooldowns);
        match resolve_and_gate(&registry, "nonexistent", &gate) {
            Err(Outcome::NotFound) => {}
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
        assert!(!cooldowns.is_armed(ACTOR, "nonexistent"));
    }

    #[test]
    fn prefix_show_scenario_rejects_for_permissions_without_arming() {
        // Guild prefix "?": message "?prefix show" from a non-privileged
        // member resolves the `prefix` command, then fails the permission
        // gate before any cooldown slot is consumed.
        let registry =
            crate::dispatch::registry::CommandRegistry::load(crate::commands::default_commands());
        let cooldowns = CooldownTracker::new();
        let (command, tokens) =
            crate::events::message::split_command_line("?prefix show", "?").unwrap();
        assert_eq!(command, "prefix");
        assert_eq!(tokens, vec!["show".to_owned()]);
        let gate = GateContext {
            permissions: Some(Permissions::SEND_MESSAGES),
            ..gate(&cooldowns)
        };
        match resolve_and_gate(&registry, &command, &gate) {
            Err(Outcome::Rejected(Rejection::MissingPermission)) => {}
            other => panic!("expected permission rejection, got {:?}", other.err()),
        }
        assert!(!cooldowns.is_armed(ACTOR, "prefix"));
    }
}
