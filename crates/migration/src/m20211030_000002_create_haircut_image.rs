//! Create `haircut_image` table with FK to `haircut`.
//!
//! Rows are removed together with their haircut.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HairCutImage::Table)
                    .if_not_exists()
                    .col(uuid(HairCutImage::Id).primary_key())
                    .col(uuid(HairCutImage::HaircutId))
                    .col(string_len_null(HairCutImage::Image, 500))
                    .col(boolean(HairCutImage::Default).default(false))
                    .col(timestamp_with_time_zone(HairCutImage::Created))
                    .col(timestamp_with_time_zone(HairCutImage::Updated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_haircut_image_haircut")
                            .from(HairCutImage::Table, HairCutImage::HaircutId)
                            .to(HairCut::Table, HairCut::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(HairCutImage::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum HairCutImage {
    #[sea_orm(iden = "haircut_image")]
    Table,
    Id,
    HaircutId,
    Image,
    Default,
    Created,
    Updated,
}

#[derive(DeriveIden)]
enum HairCut {
    #[sea_orm(iden = "haircut")]
    Table,
    Id,
}
