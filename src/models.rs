use serde::{ Deserialize, Serialize };

/// A tradable asset as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<i64>,
    pub market_cap_rank: Option<u32>,
    pub price_change_percentage_24h: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketData {
    pub current_price: Option<f64>,
    pub market_cap: Option<i64>,
    pub total_volume: Option<i64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub price_change_percentage_7d: Option<f64>,
    pub price_change_percentage_30d: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub description: Option<String>,
    pub image: String,
    pub market_cap_rank: Option<u32>,
    pub market_data: MarketData,
    pub categories: Vec<String>,
    pub genesis_date: Option<String>,
}

impl CoinDetail {
    /// Project the detail onto a list coin carrying the live market fields.
    pub fn to_coin(&self) -> Coin {
        Coin {
            id: self.id.clone(),
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            image: self.image.clone(),
            current_price: self.market_data.current_price,
            market_cap: self.market_data.market_cap,
            market_cap_rank: self.market_cap_rank,
            price_change_percentage_24h: self.market_data.price_change_percentage_24h,
        }
    }
}

/// Locally persisted favorite. Only identity fields are stored; prices are
/// fetched again whenever the list is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    /// Milliseconds since the Unix epoch.
    pub added_at: i64,
}

impl FavoriteRecord {
    pub fn from_coin(coin: &Coin) -> Self {
        Self {
            id: coin.id.clone(),
            name: coin.name.clone(),
            symbol: coin.symbol.clone(),
            image: coin.image.clone(),
            added_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn to_coin(&self) -> Coin {
        Coin {
            id: self.id.clone(),
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            image: self.image.clone(),
            current_price: None,
            market_cap: None,
            market_cap_rank: None,
            price_change_percentage_24h: None,
        }
    }
}
