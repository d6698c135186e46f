use std::cmp::Ordering;
use std::sync::Arc;

use futures::future::join_all;

use crate::db::FavoriteStore;
use crate::enums::{ FavoriteAction, SortOrder };
use crate::error::{ AppError, Result };
use crate::models::{ Coin, FavoriteRecord };
use crate::providers::CoinCatalog;

/// Favorites management on top of the local store, with live prices joined
/// in from the catalog.
pub struct FavoritesService {
    store: Arc<dyn FavoriteStore>,
    catalog: Arc<dyn CoinCatalog>,
}

impl FavoritesService {
    pub fn new(store: Arc<dyn FavoriteStore>, catalog: Arc<dyn CoinCatalog>) -> Self {
        Self { store, catalog }
    }

    /// All favorites enriched with live market data, in the requested order.
    /// Without an order the store's newest-first order is kept.
    ///
    /// A favorite whose detail lookup fails is still returned, with its
    /// market fields left empty.
    pub async fn get_favorites(&self, order: Option<SortOrder>) -> Result<Vec<Coin>> {
        let records = self.store.list().await?;

        let enriched = join_all(records.iter().map(|record| self.enrich(record))).await;

        Ok(sort_coins(enriched, order))
    }

    async fn enrich(&self, record: &FavoriteRecord) -> Coin {
        let stale = record.to_coin();

        match self.catalog.coin_detail(&record.id).await {
            Ok(detail) =>
                Coin {
                    current_price: detail.market_data.current_price,
                    market_cap: detail.market_data.market_cap,
                    market_cap_rank: detail.market_cap_rank,
                    price_change_percentage_24h: detail.market_data.price_change_percentage_24h,
                    ..stale
                },
            Err(e) => {
                tracing::warn!("Failed to refresh market data for favorite {}: {}", record.id, e);
                stale
            }
        }
    }

    pub async fn is_favorite(&self, coin_id: &str) -> Result<bool> {
        self.store.exists(coin_id).await
    }

    pub async fn count(&self) -> Result<u64> {
        self.store.count().await
    }

    pub async fn add(&self, coin: &Coin) -> Result<()> {
        if coin.id.trim().is_empty() {
            return Err(AppError::InvalidInput("Coin id must not be empty".to_string()));
        }

        self.store.add(FavoriteRecord::from_coin(coin)).await?;
        tracing::info!("Added {} to favorites", coin.id);
        Ok(())
    }

    pub async fn remove(&self, coin_id: &str) -> Result<()> {
        self.store.remove(coin_id).await?;
        tracing::info!("Removed {} from favorites", coin_id);
        Ok(())
    }

    /// Flip membership: remove when present, add when absent.
    ///
    /// The check and the write are separate store calls. Two concurrent
    /// toggles of the same coin can both add, which the upsert absorbs.
    pub async fn toggle(&self, coin: &Coin) -> Result<FavoriteAction> {
        if self.store.exists(&coin.id).await? {
            self.remove(&coin.id).await?;
            Ok(FavoriteAction::Removed)
        } else {
            self.add(coin).await?;
            Ok(FavoriteAction::Added)
        }
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.store.clear().await?;
        tracing::info!("Cleared all favorites");
        Ok(())
    }
}

/// Sort by a single key. Stable, so ties keep their input order.
///
/// Missing prices sort below every real price, missing market caps count
/// as 0 and missing 24h changes as 0.0.
pub fn sort_coins(mut coins: Vec<Coin>, order: Option<SortOrder>) -> Vec<Coin> {
    let Some(order) = order else {
        return coins;
    };

    let compare: fn(&Coin, &Coin) -> Ordering = match order {
        SortOrder::NameAsc => |a, b| by_name(a, b),
        SortOrder::NameDesc => |a, b| by_name(b, a),
        SortOrder::PriceAsc => |a, b| by_price(a, b),
        SortOrder::PriceDesc => |a, b| by_price(b, a),
        SortOrder::MarketCapAsc => |a, b| by_market_cap(a, b),
        SortOrder::MarketCapDesc => |a, b| by_market_cap(b, a),
        SortOrder::Change24hAsc => |a, b| by_change(a, b),
        SortOrder::Change24hDesc => |a, b| by_change(b, a),
    };

    coins.sort_by(compare);
    coins
}

fn by_name(a: &Coin, b: &Coin) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

fn by_price(a: &Coin, b: &Coin) -> Ordering {
    let price = |c: &Coin| c.current_price.unwrap_or(f64::NEG_INFINITY);
    price(a).total_cmp(&price(b))
}

fn by_market_cap(a: &Coin, b: &Coin) -> Ordering {
    a.market_cap.unwrap_or(0).cmp(&b.market_cap.unwrap_or(0))
}

fn by_change(a: &Coin, b: &Coin) -> Ordering {
    let change = |c: &Coin| c.price_change_percentage_24h.unwrap_or(0.0);
    change(a).total_cmp(&change(b))
}
