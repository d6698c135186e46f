//! Shared fixtures for unit tests.

use std::collections::{ HashMap, HashSet };
use std::sync::atomic::{ AtomicBool, AtomicUsize, Ordering };
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tokio::sync::watch;

use crate::db::{ FavoriteRepository, FavoriteStore };
use crate::error::{ AppError, NetworkError, Result };
use crate::models::{ Coin, CoinDetail, FavoriteRecord, MarketData };
use crate::providers::{ CoinCatalog, CoinListParams };

pub(crate) async fn memory_db() -> DatabaseConnection {
    crate::db::connect("sqlite::memory:").await.unwrap()
}

/// Wait until the published state satisfies `ready`, failing after two seconds.
pub(crate) async fn settle<S: Clone>(rx: &mut watch::Receiver<S>, ready: impl FnMut(&S) -> bool) -> S {
    tokio::time
        ::timeout(Duration::from_secs(2), rx.wait_for(ready)).await
        .expect("timed out waiting for screen state")
        .expect("screen stopped")
        .clone()
}

pub(crate) fn coin(id: &str, name: &str, symbol: &str) -> Coin {
    Coin {
        id: id.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        image: format!("https://img/{}.png", id),
        current_price: None,
        market_cap: None,
        market_cap_rank: None,
        price_change_percentage_24h: None,
    }
}

pub(crate) fn ranked(id: &str, name: &str, symbol: &str, rank: u32) -> Coin {
    Coin { market_cap_rank: Some(rank), ..coin(id, name, symbol) }
}

pub(crate) fn priced(id: &str, price: f64) -> Coin {
    Coin { current_price: Some(price), ..coin(id, &id.to_uppercase(), &id.to_uppercase()) }
}

pub(crate) fn detail_for(coin: &Coin) -> CoinDetail {
    CoinDetail {
        id: coin.id.clone(),
        name: coin.name.clone(),
        symbol: coin.symbol.clone(),
        description: None,
        image: coin.image.clone(),
        market_cap_rank: coin.market_cap_rank,
        market_data: MarketData {
            current_price: coin.current_price,
            market_cap: coin.market_cap,
            price_change_percentage_24h: coin.price_change_percentage_24h,
            ..MarketData::default()
        },
        categories: vec![],
        genesis_date: None,
    }
}

/// In-memory catalog that records what it was asked.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    pub coins: Vec<Coin>,
    pub search_results: Vec<Coin>,
    pub trending: Vec<Coin>,
    pub details: HashMap<String, CoinDetail>,
    pub search_delays: HashMap<String, Duration>,
    pub failing: AtomicBool,
    pub search_queries: Mutex<Vec<String>>,
    pub list_calls: AtomicUsize,
    pub trending_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn searched(&self) -> Vec<String> {
        self.search_queries.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::Network(NetworkError::NoInternet))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CoinCatalog for FakeCatalog {
    async fn list_coins(&self, _params: &CoinListParams) -> Result<Vec<Coin>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.coins.clone())
    }

    async fn search_coins(&self, query: &str) -> Result<Vec<Coin>> {
        self.search_queries.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.search_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        self.check()?;
        Ok(
            self.search_results
                .iter()
                .filter(|c| {
                    c.name.to_lowercase().contains(query) ||
                        c.symbol.to_lowercase().contains(query)
                })
                .cloned()
                .collect()
        )
    }

    async fn trending_coins(&self) -> Result<Vec<Coin>> {
        self.trending_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.trending.clone())
    }

    async fn coin_detail(&self, coin_id: &str) -> Result<CoinDetail> {
        self.check()?;
        self.details
            .get(coin_id)
            .cloned()
            .ok_or(AppError::Network(NetworkError::NotFound))
    }
}

/// Favorites store over in-memory SQLite that can slow down or reject
/// writes per coin id, or fail everything.
pub(crate) struct FlakyStore {
    pub inner: FavoriteRepository,
    pub write_delays: HashMap<String, Duration>,
    pub rejected_writes: HashSet<String>,
    pub failing: AtomicBool,
}

impl FlakyStore {
    pub async fn new() -> Self {
        Self {
            inner: FavoriteRepository::new(memory_db().await),
            write_delays: HashMap::new(),
            rejected_writes: HashSet::new(),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::Internal("favorites store unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    async fn check_write(&self, coin_id: &str) -> Result<()> {
        if let Some(delay) = self.write_delays.get(coin_id) {
            tokio::time::sleep(*delay).await;
        }
        if self.rejected_writes.contains(coin_id) {
            return Err(AppError::Internal(format!("write rejected for {}", coin_id)));
        }
        self.check()
    }
}

#[async_trait]
impl FavoriteStore for FlakyStore {
    async fn list(&self) -> Result<Vec<FavoriteRecord>> {
        self.check()?;
        self.inner.list().await
    }

    async fn count(&self) -> Result<u64> {
        self.check()?;
        self.inner.count().await
    }

    async fn exists(&self, coin_id: &str) -> Result<bool> {
        self.check()?;
        self.inner.exists(coin_id).await
    }

    async fn add(&self, record: FavoriteRecord) -> Result<()> {
        self.check_write(&record.id).await?;
        self.inner.add(record).await
    }

    async fn remove(&self, coin_id: &str) -> Result<()> {
        self.check_write(coin_id).await?;
        self.inner.remove(coin_id).await
    }

    async fn clear(&self) -> Result<()> {
        self.check()?;
        self.inner.clear().await
    }
}
