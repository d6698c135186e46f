use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FavoriteCoins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FavoriteCoins::CoinId).string().not_null().primary_key())
                    .col(ColumnDef::new(FavoriteCoins::Name).string().not_null())
                    .col(ColumnDef::new(FavoriteCoins::Symbol).string().not_null())
                    .col(ColumnDef::new(FavoriteCoins::Image).string().not_null())
                    .col(ColumnDef::new(FavoriteCoins::AddedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Listing is always newest first
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_favorite_coins_added_at")
                    .table(FavoriteCoins::Table)
                    .col(FavoriteCoins::AddedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FavoriteCoins::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FavoriteCoins {
    Table,
    CoinId,
    Name,
    Symbol,
    Image,
    AddedAt,
}
