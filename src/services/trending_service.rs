use std::sync::Arc;

use crate::error::Result;
use crate::models::Coin;
use crate::providers::CoinCatalog;

pub const MAX_TRENDING_COINS: usize = 10;
pub const MAX_RANK_FOR_TRENDING: u32 = 100;

pub struct TrendingService {
    catalog: Arc<dyn CoinCatalog>,
}

impl TrendingService {
    pub fn new(catalog: Arc<dyn CoinCatalog>) -> Self {
        Self { catalog }
    }

    /// Fetch the trending feed and curate it.
    pub async fn trending(&self) -> Result<Vec<Coin>> {
        let feed = self.catalog.trending_coins().await?;
        Ok(curate_trending(feed))
    }
}

/// Keep well-ranked coins only, re-order them by 24h momentum and cap the
/// list at [`MAX_TRENDING_COINS`]. The feed's own order is only used to
/// break ties.
pub fn curate_trending(coins: Vec<Coin>) -> Vec<Coin> {
    let mut picks: Vec<Coin> = coins
        .into_iter()
        .filter(|coin| {
            !coin.name.trim().is_empty() &&
                !coin.symbol.trim().is_empty() &&
                matches!(coin.market_cap_rank, Some(rank) if rank <= MAX_RANK_FOR_TRENDING)
        })
        .collect();

    picks.sort_by(|a, b| change_24h(b).total_cmp(&change_24h(a)));
    picks.truncate(MAX_TRENDING_COINS);
    picks
}

fn change_24h(coin: &Coin) -> f64 {
    coin.price_change_percentage_24h.unwrap_or(0.0)
}
