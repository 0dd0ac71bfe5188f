//! Per-user leveling and coin balances, shared across guilds.

use sea_orm::entity::prelude::*;

/// Experience needed per level; level = experience / 100.
pub const XP_PER_LEVEL: i64 = 100;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub discord_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub level: i32,
    pub experience: i64,
    pub coins: i64,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn level_for(experience: i64) -> i32 {
    (experience / XP_PER_LEVEL) as i32
}

impl Model {
    pub fn xp_into_level(&self) -> i64 {
        self.experience % XP_PER_LEVEL
    }

    pub fn xp_for_next_level(&self) -> i64 {
        XP_PER_LEVEL - self.xp_into_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_experience_over_one_hundred() {
        assert_eq!(level_for(0), 0);
        assert_eq!(level_for(99), 0);
        assert_eq!(level_for(100), 1);
        assert_eq!(level_for(250), 2);
    }
}
