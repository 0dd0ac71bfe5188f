use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Guilds::Table)
                    .col(pk_auto(Guilds::Id))
                    .col(string_uniq(Guilds::DiscordId))
                    .col(string(Guilds::Name))
                    .col(string(Guilds::Prefix).default("!"))
                    .col(boolean(Guilds::IsActive).default(true))
                    .col(json_null(Guilds::Settings))
                    .col(json_null(Guilds::DisabledCommands))
                    .col(timestamp_with_time_zone(Guilds::CreatedAt))
                    .col(timestamp_with_time_zone(Guilds::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .col(pk_auto(Users::Id))
                    .col(string_uniq(Users::DiscordId))
                    .col(string(Users::Username))
                    .col(string_null(Users::DisplayName))
                    .col(integer(Users::Level).default(0))
                    .col(big_integer(Users::Experience).default(0))
                    .col(big_integer(Users::Coins).default(0))
                    .col(boolean(Users::IsActive).default(true))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Guilds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Guilds {
    Table,
    Id,
    DiscordId,
    Name,
    Prefix,
    IsActive,
    Settings,
    DisabledCommands,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    DiscordId,
    Username,
    DisplayName,
    Level,
    Experience,
    Coins,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
