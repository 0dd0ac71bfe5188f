pub mod client;
pub mod database;
pub mod logging;
pub mod shutdown;

pub mod commands {
    pub mod help;
    pub mod info;
    pub mod ping;
    pub mod prefix;
    pub mod rank;
    pub mod settings;
    pub mod shards;

    use crate::dispatch::registry::CommandSpec;

    /// The static registration list consumed by `CommandRegistry::load` at
    /// startup. Every command the bot ships is listed here explicitly.
    pub fn default_commands() -> Vec<CommandSpec> {
        vec![
            ping::ping(),
            help::help(),
            info::info(),
            prefix::prefix(),
            settings::enable(),
            settings::disable(),
            settings::leveling(),
            rank::rank(),
            rank::leaderboard(),
            shards::shards(),
        ]
    }
}

pub mod dispatch {
    pub mod args;
    pub mod context;
    pub mod cooldown;
    pub mod core;
    pub mod registry;
    pub mod reply;
}

pub mod entities {
    pub mod guild;
    pub mod user;
}

pub mod events {
    pub mod guild;
    pub mod interaction;
    pub mod message;
    pub mod ready;
}

pub mod infrastructure {
    pub mod botdata;
    pub mod colors;
    pub mod environment;
    pub mod event_handler;
    pub mod util;
}

pub mod services {
    pub mod guilds;
    pub mod users;
}
