use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue,
    DatabaseConnection,
    EntityTrait,
    PaginatorTrait,
    QueryOrder,
};

use crate::db::entity::favorite_coin;
use crate::error::Result;
use crate::models::FavoriteRecord;

/// Durable favorites list keyed by coin id.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// All favorites, most recently added first
    async fn list(&self) -> Result<Vec<FavoriteRecord>>;

    async fn count(&self) -> Result<u64>;

    async fn exists(&self, coin_id: &str) -> Result<bool>;

    /// Insert, or overwrite the record with the same id
    async fn add(&self, record: FavoriteRecord) -> Result<()>;

    async fn remove(&self, coin_id: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct FavoriteRepository {
    db: DatabaseConnection,
}

impl FavoriteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FavoriteStore for FavoriteRepository {
    async fn list(&self) -> Result<Vec<FavoriteRecord>> {
        let models = favorite_coin::Entity::find()
            .order_by_desc(favorite_coin::Column::AddedAt)
            .order_by_asc(favorite_coin::Column::CoinId)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(FavoriteRecord::from).collect())
    }

    async fn count(&self) -> Result<u64> {
        let count = favorite_coin::Entity::find().count(&self.db).await?;
        Ok(count)
    }

    async fn exists(&self, coin_id: &str) -> Result<bool> {
        let found = favorite_coin::Entity::find_by_id(coin_id.to_string())
            .one(&self.db)
            .await?;
        Ok(found.is_some())
    }

    async fn add(&self, record: FavoriteRecord) -> Result<()> {
        let model = favorite_coin::ActiveModel {
            coin_id: ActiveValue::Set(record.id),
            name: ActiveValue::Set(record.name),
            symbol: ActiveValue::Set(record.symbol),
            image: ActiveValue::Set(record.image),
            added_at: ActiveValue::Set(record.added_at),
        };

        favorite_coin::Entity::insert(model)
            .on_conflict(
                OnConflict::column(favorite_coin::Column::CoinId)
                    .update_columns([
                        favorite_coin::Column::Name,
                        favorite_coin::Column::Symbol,
                        favorite_coin::Column::Image,
                        favorite_coin::Column::AddedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn remove(&self, coin_id: &str) -> Result<()> {
        favorite_coin::Entity::delete_by_id(coin_id.to_string())
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        favorite_coin::Entity::delete_many().exec(&self.db).await?;
        Ok(())
    }
}
