//! Create `haircut` table.
//!
//! Service offerings; `code` and `description` are unique when present.
use sea_orm_migration::{prelude::*, schema::*, sea_orm::DatabaseBackend};

/// Postgres keeps the full `numeric(22, 2)`; SQLite tops out at 16 digits of
/// precision, the 22-digit limit is enforced by the model validation there.
fn price_column(backend: DatabaseBackend) -> ColumnDef {
    match backend {
        DatabaseBackend::Sqlite => decimal_len(HairCut::Price, 16, 2),
        _ => decimal_len(HairCut::Price, 22, 2),
    }
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut price = price_column(manager.get_database_backend());
        manager
            .create_table(
                Table::create()
                    .table(HairCut::Table)
                    .if_not_exists()
                    .col(uuid(HairCut::Id).primary_key())
                    .col(string_len_null(HairCut::Code, 20).unique_key())
                    .col(string_len_null(HairCut::Description, 255).unique_key())
                    .col(price.default(0))
                    .col(integer(HairCut::Minutes).default(10))
                    .col(boolean(HairCut::IsActive).default(true))
                    .col(timestamp_with_time_zone(HairCut::Created))
                    .col(timestamp_with_time_zone(HairCut::Updated))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(HairCut::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum HairCut {
    #[sea_orm(iden = "haircut")]
    Table,
    Id,
    Code,
    Description,
    Price,
    Minutes,
    IsActive,
    Created,
    Updated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_precision_fits_each_backend() {
        let sqlite = Table::create()
            .table(HairCut::Table)
            .col(price_column(DatabaseBackend::Sqlite))
            .to_string(SqliteQueryBuilder);
        assert!(sqlite.contains("real(16, 2)"), "{sqlite}");

        let postgres = Table::create()
            .table(HairCut::Table)
            .col(price_column(DatabaseBackend::Postgres))
            .to_string(PostgresQueryBuilder);
        assert!(postgres.contains("decimal(22, 2)"), "{postgres}");
    }
}
