//! Create `user` table.
//!
//! `current_photo_id` points at `photo_user`, which in turn references this
//! table, so it is kept as a plain indexed column without a foreign key.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len_null(User::Username, 255).unique_key())
                    .col(string_len(User::Email, 255).unique_key())
                    .col(string_len_null(User::Name, 255))
                    .col(string_len(User::LastName, 255).default(""))
                    .col(string_len(User::Password, 255))
                    .col(string_len_null(User::Direction, 255))
                    .col(string_len_null(User::Phone, 32))
                    .col(text_null(User::About))
                    .col(double_null(User::Latitude))
                    .col(double_null(User::Longitude))
                    .col(small_integer(User::Status).default(1))
                    .col(boolean(User::IsBarber).default(false))
                    .col(boolean(User::IsSuperuser).default(false))
                    .col(boolean(User::IsActive).default(true))
                    .col(json_binary(User::Info))
                    .col(uuid(User::JwtId))
                    .col(timestamp_with_time_zone_null(User::LastLogin))
                    .col(timestamp_with_time_zone_null(User::LastPasswordChange))
                    .col(timestamp_with_time_zone_null(User::LastSyncDate))
                    .col(uuid_null(User::CurrentPhotoId))
                    .col(timestamp_with_time_zone(User::Created))
                    .col(timestamp_with_time_zone(User::Updated))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    Username,
    Email,
    Name,
    LastName,
    Password,
    Direction,
    Phone,
    About,
    Latitude,
    Longitude,
    Status,
    IsBarber,
    IsSuperuser,
    IsActive,
    Info,
    JwtId,
    LastLogin,
    LastPasswordChange,
    LastSyncDate,
    CurrentPhotoId,
    Created,
    Updated,
}
