use std::sync::Arc;

use crate::error::Result;
use crate::models::Coin;
use crate::providers::{ CoinCatalog, CoinListParams };
use crate::services::favorites_service::sort_coins;

/// Market listing with unusable rows removed.
pub struct MarketService {
    catalog: Arc<dyn CoinCatalog>,
}

impl MarketService {
    pub fn new(catalog: Arc<dyn CoinCatalog>) -> Self {
        Self { catalog }
    }

    /// One page of coins, filtered and sorted by `params.sort_order`.
    pub async fn get_coins(&self, params: CoinListParams) -> Result<Vec<Coin>> {
        let coins = self.catalog.list_coins(&params).await?;
        let total = coins.len();

        let listed: Vec<Coin> = coins.into_iter().filter(is_listable).collect();
        if listed.len() < total {
            tracing::debug!("Dropped {} unlisted coins from page {}", total - listed.len(), params.page);
        }

        Ok(sort_coins(listed, Some(params.sort_order)))
    }
}

fn is_listable(coin: &Coin) -> bool {
    matches!(coin.current_price, Some(price) if price > 0.0) &&
        !coin.name.trim().is_empty() &&
        !coin.symbol.trim().is_empty()
}
