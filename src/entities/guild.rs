//! Guild configuration record: command prefix, per-guild settings, and the
//! set of disabled commands. One row per guild, created on first contact.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "guilds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub discord_id: String,
    pub name: String,
    pub prefix: String,
    pub is_active: bool,
    pub settings: Option<Json>,
    pub disabled_commands: Option<Json>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn disabled(&self) -> Vec<String> {
        self.disabled_commands
            .as_ref()
            .and_then(|json| json.as_array())
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|value| value.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_command_disabled(&self, command: &str) -> bool {
        self.disabled()
            .iter()
            .any(|disabled| disabled == command)
    }

    pub fn setting(&self, key: &str) -> Option<&Json> {
        self.settings.as_ref()?.get(key)
    }

    /// Leveling defaults to on when the setting was never written.
    pub fn leveling_enabled(&self) -> bool {
        self.setting("levelingEnabled")
            .and_then(Json::as_bool)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::JsonValue;

    fn model() -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            discord_id: "123".into(),
            name: "test guild".into(),
            prefix: "!".into(),
            is_active: true,
            settings: None,
            disabled_commands: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn no_disabled_commands_by_default() {
        let guild = model();
        assert!(guild.disabled().is_empty());
        assert!(!guild.is_command_disabled("ping"));
    }

    #[test]
    fn disabled_commands_round_trip_through_json() {
        let mut guild = model();
        guild.disabled_commands = Some(JsonValue::Array(vec![
            JsonValue::String("ping".into()),
            JsonValue::String("rank".into()),
        ]));
        assert!(guild.is_command_disabled("ping"));
        assert!(!guild.is_command_disabled("help"));
    }

    #[test]
    fn leveling_defaults_on_and_respects_the_setting() {
        let mut guild = model();
        assert!(guild.leveling_enabled());
        guild.settings = Some(serde_json::json!({ "levelingEnabled": false }));
        assert!(!guild.leveling_enabled());
    }
}
