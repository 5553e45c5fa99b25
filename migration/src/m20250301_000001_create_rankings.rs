// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rankings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rankings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rankings::RestaurantSlug).string().not_null())
                    .col(ColumnDef::new(Rankings::Rank).integer().not_null())
                    .col(ColumnDef::new(Rankings::Rating).double())
                    .col(
                        ColumnDef::new(Rankings::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 按餐厅查询最近排名
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rankings_slug_timestamp")
                    .table(Rankings::Table)
                    .col(Rankings::RestaurantSlug)
                    .col(Rankings::Timestamp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_rankings_slug_timestamp")
                    .table(Rankings::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Rankings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Rankings {
    Table,
    Id,
    RestaurantSlug,
    Rank,
    Rating,
    Timestamp,
}
