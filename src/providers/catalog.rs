use async_trait::async_trait;
use crate::enums::SortOrder;
use crate::error::Result;
use crate::models::{ Coin, CoinDetail };

/// Paging and ordering for the market listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinListParams {
    pub vs_currency: String,
    pub sort_order: SortOrder,
    pub per_page: u32,
    pub page: u32,
}

impl Default for CoinListParams {
    fn default() -> Self {
        Self {
            vs_currency: "usd".to_string(),
            sort_order: SortOrder::MarketCapDesc,
            per_page: 20,
            page: 1,
        }
    }
}

/// Remote market-data source. Results come back raw: ranking, curation and
/// filtering happen in the services.
#[async_trait]
pub trait CoinCatalog: Send + Sync {
    /// One page of coins with market data
    async fn list_coins(&self, params: &CoinListParams) -> Result<Vec<Coin>>;

    /// Unranked text matches for an already-normalized query
    async fn search_coins(&self, query: &str) -> Result<Vec<Coin>>;

    /// Uncurated trending feed
    async fn trending_coins(&self) -> Result<Vec<Coin>>;

    /// Full detail for a single coin
    async fn coin_detail(&self, coin_id: &str) -> Result<CoinDetail>;
}
