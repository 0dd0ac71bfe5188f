use serenity::all::{ChannelId, ResolvedOption, ResolvedValue, UserId};

use crate::lazy_regex;

lazy_regex! {USER_MENTION, r"^<@!?(\d+)>$"}
lazy_regex! {CHANNEL_MENTION, r"^<#(\d+)>$"}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    User(UserId),
    Channel(ChannelId),
}

/// Arguments carried by an invocation, unified across both ingestion paths.
///
/// `Named` holds already-structured slash options. `Positional` holds the
/// raw tokens of a prefix invocation; on that variant every typed getter
/// reads the *first* token (a single shared argument slot), which makes
/// multi-argument commands unusable via the prefix path. This mirrors the
/// source system's behavior and is kept deliberately as a known limitation.
#[derive(Debug, Clone, PartialEq)]
pub enum Args {
    Named {
        subcommand: Option<String>,
        values: Vec<(String, ArgValue)>,
    },
    Positional(Vec<String>),
}

impl Args {
    pub fn none() -> Self {
        Args::Named {
            subcommand: None,
            values: Vec::new(),
        }
    }

    /// Converts the structured options of a slash interaction. A leading
    /// subcommand is unwrapped so its nested options resolve by name.
    pub fn from_resolved(options: &[ResolvedOption<'_>]) -> Self {
        if let [option] = options
            && let ResolvedValue::SubCommand(nested) = &option.value
        {
            return Args::Named {
                subcommand: Some(option.name.to_owned()),
                values: convert(nested),
            };
        }
        Args::Named {
            subcommand: None,
            values: convert(options),
        }
    }

    pub fn subcommand(&self) -> Option<String> {
        match self {
            Args::Named { subcommand, .. } => subcommand.clone(),
            Args::Positional(tokens) => tokens.first().map(|t| t.to_lowercase()),
        }
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        match self {
            Args::Named { .. } => match self.named(name)? {
                ArgValue::String(s) => Some(s.clone()),
                _ => None,
            },
            Args::Positional(tokens) => tokens.first().cloned(),
        }
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        match self {
            Args::Named { .. } => match self.named(name)? {
                ArgValue::Integer(i) => Some(*i),
                _ => None,
            },
            Args::Positional(tokens) => tokens.first()?.parse().ok(),
        }
    }

    /// On the positional variant, only `true`, `1` and `yes` (any case)
    /// count as true; any other present token is false.
    pub fn get_boolean(&self, name: &str) -> Option<bool> {
        match self {
            Args::Named { .. } => match self.named(name)? {
                ArgValue::Boolean(b) => Some(*b),
                _ => None,
            },
            Args::Positional(tokens) => {
                let token = tokens.first()?.to_lowercase();
                Some(matches!(token.as_str(), "true" | "1" | "yes"))
            }
        }
    }

    pub fn get_user(&self, name: &str) -> Option<UserId> {
        match self {
            Args::Named { .. } => match self.named(name)? {
                ArgValue::User(id) => Some(*id),
                _ => None,
            },
            Args::Positional(tokens) => {
                let raw = USER_MENTION.captures(tokens.first()?)?.get(1)?.as_str();
                raw.parse::<u64>().ok().map(UserId::new)
            }
        }
    }

    pub fn get_channel(&self, name: &str) -> Option<ChannelId> {
        match self {
            Args::Named { .. } => match self.named(name)? {
                ArgValue::Channel(id) => Some(*id),
                _ => None,
            },
            Args::Positional(tokens) => {
                let raw = CHANNEL_MENTION.captures(tokens.first()?)?.get(1)?.as_str();
                raw.parse::<u64>().ok().map(ChannelId::new)
            }
        }
    }

    fn named(&self, name: &str) -> Option<&ArgValue> {
        match self {
            Args::Named { values, .. } => values
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value),
            Args::Positional(_) => None,
        }
    }
}

fn convert(options: &[ResolvedOption<'_>]) -> Vec<(String, ArgValue)> {
    options
        .iter()
        .filter_map(|option| {
            let value = match &option.value {
                ResolvedValue::String(s) => ArgValue::String((*s).to_owned()),
                ResolvedValue::Integer(i) => ArgValue::Integer(*i),
                ResolvedValue::Boolean(b) => ArgValue::Boolean(*b),
                ResolvedValue::User(user, _) => ArgValue::User(user.id),
                ResolvedValue::Channel(channel) => ArgValue::Channel(channel.id),
                _ => return None,
            };
            Some((option.name.to_owned(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positional(tokens: &[&str]) -> Args {
        Args::Positional(tokens.iter().map(|t| (*t).to_owned()).collect())
    }

    #[test]
    fn positional_getters_share_the_first_slot() {
        let args = positional(&["42", "ignored", "also-ignored"]);
        assert_eq!(args.get_string("anything"), Some("42".into()));
        assert_eq!(args.get_integer("anything"), Some(42));
        assert_eq!(args.get_boolean("anything"), Some(false));
        assert_eq!(args.subcommand(), Some("42".into()));
    }

    #[test]
    fn positional_user_and_channel_mentions_parse() {
        assert_eq!(
            positional(&["<@123>"]).get_user("target"),
            Some(UserId::new(123))
        );
        assert_eq!(
            positional(&["<@!456>"]).get_user("target"),
            Some(UserId::new(456))
        );
        assert_eq!(
            positional(&["<#789>"]).get_channel("where"),
            Some(ChannelId::new(789))
        );
        assert_eq!(positional(&["plain"]).get_user("target"), None);
    }

    #[test]
    fn positional_boolean_accepts_truthy_tokens_only() {
        assert_eq!(positional(&["true"]).get_boolean("x"), Some(true));
        assert_eq!(positional(&["YES"]).get_boolean("x"), Some(true));
        assert_eq!(positional(&["1"]).get_boolean("x"), Some(true));
        assert_eq!(positional(&["off"]).get_boolean("x"), Some(false));
        assert_eq!(positional(&[]).get_boolean("x"), None);
    }

    #[test]
    fn named_values_resolve_by_option_name_and_type() {
        let args = Args::Named {
            subcommand: Some("set".into()),
            values: vec![
                ("new_prefix".into(), ArgValue::String("?".into())),
                ("limit".into(), ArgValue::Integer(5)),
                ("coins".into(), ArgValue::Boolean(true)),
            ],
        };
        assert_eq!(args.subcommand(), Some("set".into()));
        assert_eq!(args.get_string("new_prefix"), Some("?".into()));
        assert_eq!(args.get_integer("limit"), Some(5));
        assert_eq!(args.get_boolean("coins"), Some(true));
        // Type mismatches and unknown names resolve to absent, not panics.
        assert_eq!(args.get_integer("new_prefix"), None);
        assert_eq!(args.get_string("missing"), None);
    }
}
