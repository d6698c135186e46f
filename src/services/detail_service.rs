use std::sync::Arc;

use crate::error::{ AppError, Result };
use crate::models::CoinDetail;
use crate::providers::CoinCatalog;

pub struct DetailService {
    catalog: Arc<dyn CoinCatalog>,
}

impl DetailService {
    pub fn new(catalog: Arc<dyn CoinCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn get_coin_detail(&self, coin_id: &str) -> Result<CoinDetail> {
        let coin_id = coin_id.trim();
        if coin_id.is_empty() {
            return Err(AppError::InvalidInput("Coin id must not be empty".to_string()));
        }

        self.catalog.coin_detail(coin_id).await
    }
}
