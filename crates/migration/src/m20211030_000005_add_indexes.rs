use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // HairCutImage: lookups by parent
        manager
            .create_index(
                Index::create()
                    .name("idx_haircut_image_haircut")
                    .table(HairCutImage::Table)
                    .col(HairCutImage::HaircutId)
                    .to_owned(),
            )
            .await?;

        // PhotoUser: lookups by parent
        manager
            .create_index(
                Index::create()
                    .name("idx_photo_user_user")
                    .table(PhotoUser::Table)
                    .col(PhotoUser::UserId)
                    .to_owned(),
            )
            .await?;

        // User: weak reference to the current photo
        manager
            .create_index(
                Index::create()
                    .name("idx_user_current_photo")
                    .table(User::Table)
                    .col(User::CurrentPhotoId)
                    .to_owned(),
            )
            .await?;

        // User: listing filters
        manager
            .create_index(
                Index::create()
                    .name("idx_user_status")
                    .table(User::Table)
                    .col(User::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_haircut_image_haircut").table(HairCutImage::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_photo_user_user").table(PhotoUser::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_current_photo").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_status").table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum HairCutImage {
    #[sea_orm(iden = "haircut_image")]
    Table,
    HaircutId,
}

#[derive(DeriveIden)]
enum PhotoUser { Table, UserId }

#[derive(DeriveIden)]
enum User { Table, CurrentPhotoId, Status }
