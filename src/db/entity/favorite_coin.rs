use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

use crate::models::FavoriteRecord;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "favorite_coins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub coin_id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub added_at: i64, // unix millis
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FavoriteRecord {
    fn from(model: Model) -> Self {
        FavoriteRecord {
            id: model.coin_id,
            name: model.name,
            symbol: model.symbol,
            image: model.image,
            added_at: model.added_at,
        }
    }
}
