//! Create `photo_user` table with FK to `user`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PhotoUser::Table)
                    .if_not_exists()
                    .col(uuid(PhotoUser::Id).primary_key())
                    .col(uuid(PhotoUser::UserId))
                    .col(string_len_null(PhotoUser::Photo, 500))
                    .col(timestamp_with_time_zone(PhotoUser::Created))
                    .col(timestamp_with_time_zone(PhotoUser::Updated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photo_user_user")
                            .from(PhotoUser::Table, PhotoUser::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PhotoUser::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PhotoUser { Table, Id, UserId, Photo, Created, Updated }

#[derive(DeriveIden)]
enum User { Table, Id }
