//! Create tariffs table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tariffs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tariffs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tariffs::Direction).string().not_null())
                    .col(
                        ColumnDef::new(Tariffs::DirectionKey)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Tariffs::BaseCost).double().not_null())
                    .col(
                        ColumnDef::new(Tariffs::DiscountType)
                            .string()
                            .not_null()
                            .default("NoDiscount"),
                    )
                    .col(ColumnDef::new(Tariffs::DiscountPercent).integer())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tariffs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Tariffs {
    Table,
    Id,
    Direction,
    DirectionKey,
    BaseCost,
    DiscountType,
    DiscountPercent,
}
