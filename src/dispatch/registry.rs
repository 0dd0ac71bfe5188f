use std::collections::HashMap;
use std::pin::Pin;

use serenity::all::{CreateCommand, Permissions};
use thiserror::Error;
use tracing::{info, warn};

use crate::dispatch::context::Invocation;
use crate::infrastructure::environment;

pub type CommandFuture<'a> =
    Pin<Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// A command body. Plain function pointer so descriptors stay `'static`
/// data; each command module wraps its async fn with `Box::pin`.
pub type CommandHandler = for<'a> fn(&'a Invocation) -> CommandFuture<'a>;

/// Static metadata plus handler for one command. Built once at startup,
/// never mutated afterwards.
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub cooldown_secs: Option<u64>,
    pub permissions: Permissions,
    pub guild_only: bool,
    pub owner_only: bool,
    pub handler: CommandHandler,
    configure_slash: Option<fn(CreateCommand) -> CreateCommand>,
}

impl CommandSpec {
    pub fn new(
        name: &'static str,
        description: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            category: "general",
            cooldown_secs: None,
            permissions: Permissions::empty(),
            guild_only: false,
            owner_only: false,
            handler,
            configure_slash: None,
        }
    }

    pub fn category(mut self, category: &'static str) -> Self {
        self.category = category;
        self
    }

    pub fn cooldown(mut self, seconds: u64) -> Self {
        self.cooldown_secs = Some(seconds);
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    pub fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    /// Extra option wiring applied when the command is registered as a
    /// slash command.
    pub fn slash_options(mut self, configure: fn(CreateCommand) -> CreateCommand) -> Self {
        self.configure_slash = Some(configure);
        self
    }

    /// The REST registration payload for this command.
    pub fn to_create_command(&self) -> CreateCommand {
        let mut command = CreateCommand::new(self.name)
            .description(self.description)
            .dm_permission(!self.guild_only);
        if !self.permissions.is_empty() {
            command = command.default_member_permissions(self.permissions);
        }
        match self.configure_slash {
            Some(configure) => configure(command),
            None => command,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command `{0}` is already registered")]
    DuplicateCommand(String),
    #[error("invalid command name `{0}`: {1}")]
    InvalidName(String, &'static str),
}

/// Name-to-descriptor map. Populated once at startup by `load`, read-only
/// from the dispatch path's perspective.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandSpec>,
}

impl CommandRegistry {
    pub fn register(&mut self, spec: CommandSpec) -> Result<(), RegistryError> {
        if spec.name.is_empty() {
            return Err(RegistryError::InvalidName(
                spec.name.to_owned(),
                "name must not be empty",
            ));
        }
        if spec.name.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName(
                spec.name.to_owned(),
                "name must not contain whitespace",
            ));
        }
        if spec.name.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(RegistryError::InvalidName(
                spec.name.to_owned(),
                "name must be lowercase",
            ));
        }
        if self.commands.contains_key(spec.name) {
            return Err(RegistryError::DuplicateCommand(spec.name.to_owned()));
        }
        self.commands.insert(spec.name.to_owned(), spec);
        Ok(())
    }

    /// Pure, total lookup. Prefix-path callers lowercase the name first;
    /// that is the case-insensitive match point.
    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Loads the startup registration list. A descriptor that fails
    /// validation is logged and skipped, never fatal to the remaining
    /// loads. Commands named in the `COMMAND_DISABLE_LIST` environment
    /// variable are left out entirely.
    pub fn load(specs: Vec<CommandSpec>) -> Self {
        let disable_list = std::env::var(environment::COMMAND_DISABLE_LIST).unwrap_or_default();
        let disabled: Vec<String> = disable_list
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !disabled.is_empty() {
            info!("Commands disabled by environment: {:?}", disabled);
        }

        let mut registry = Self::default();
        for spec in specs {
            if disabled.iter().any(|name| name == spec.name) {
                continue;
            }
            let name = spec.name;
            match registry.register(spec) {
                Ok(()) => info!("Loaded command: {name}"),
                Err(e) => warn!("Skipping command {name}: {e}"),
            }
        }
        info!("Loaded {} commands", registry.len());
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_inv: &Invocation) -> CommandFuture<'_> {
        Box::pin(async { Ok(()) })
    }

    fn spec(name: &'static str) -> CommandSpec {
        CommandSpec::new(name, "a test command", noop)
    }

    #[test]
    fn duplicate_registration_fails_and_keeps_the_first() {
        let mut registry = CommandRegistry::default();
        registry
            .register(spec("ping").category("utility"))
            .unwrap();
        let err = registry.register(spec("ping")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateCommand("ping".into()));
        assert_eq!(registry.lookup("ping").unwrap().category, "utility");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_is_total_and_never_panics() {
        let registry = CommandRegistry::default();
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn malformed_names_are_rejected() {
        let mut registry = CommandRegistry::default();
        assert!(matches!(
            registry.register(spec("")),
            Err(RegistryError::InvalidName(_, _))
        ));
        assert!(matches!(
            registry.register(spec("two words")),
            Err(RegistryError::InvalidName(_, _))
        ));
        assert!(matches!(
            registry.register(spec("Ping")),
            Err(RegistryError::InvalidName(_, _))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn load_skips_failures_without_aborting() {
        let registry = CommandRegistry::load(vec![spec("ping"), spec("Bad Name"), spec("info")]);
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("ping").is_some());
        assert!(registry.lookup("info").is_some());
    }

    #[test]
    fn default_category_is_general() {
        assert_eq!(spec("x").category, "general");
    }

    #[test]
    fn default_commands_all_register() {
        let specs = crate::commands::default_commands();
        let expected = specs.len();
        let registry = CommandRegistry::load(specs);
        assert_eq!(registry.len(), expected);
    }
}
