use std::collections::HashMap;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{ HeaderMap, HeaderValue, ACCEPT };
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{ AppError, NetworkError, Result };
use crate::models::{ Coin, CoinDetail, MarketData };
use crate::providers::catalog::{ CoinCatalog, CoinListParams };

const API_KEY_HEADER: &str = "x-cg-demo-api-key";

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// CoinGecko v3 REST client.
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    vs_currency: String,
}

// ── Markets response types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MarketCoinResponse {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    image: Option<String>,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    market_cap_rank: Option<u32>,
    price_change_percentage_24h: Option<f64>,
}

// ── Search response types ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoinResponse>,
}

#[derive(Debug, Deserialize)]
struct SearchCoinResponse {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    thumb: Option<String>,
    market_cap_rank: Option<u32>,
}

// ── Trending response types ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    coins: Vec<TrendingCoinWrapper>,
}

#[derive(Debug, Deserialize)]
struct TrendingCoinWrapper {
    item: TrendingCoinResponse,
}

#[derive(Debug, Deserialize)]
struct TrendingCoinResponse {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    small: Option<String>,
    market_cap_rank: Option<u32>,
    #[serde(default)]
    data: Option<TrendingCoinData>,
}

#[derive(Debug, Deserialize)]
struct TrendingCoinData {
    /// Always quoted in USD
    price: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h: HashMap<String, f64>,
}

// ── Detail response types ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CoinDetailResponse {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    description: DescriptionResponse,
    #[serde(default)]
    image: CoinImageResponse,
    market_cap_rank: Option<u32>,
    #[serde(default)]
    market_data: MarketDataResponse,
    #[serde(default)]
    categories: Vec<Option<String>>,
    genesis_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DescriptionResponse {
    en: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CoinImageResponse {
    large: Option<String>,
    small: Option<String>,
    thumb: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MarketDataResponse {
    current_price: HashMap<String, f64>,
    market_cap: HashMap<String, f64>,
    total_volume: HashMap<String, f64>,
    high_24h: HashMap<String, f64>,
    low_24h: HashMap<String, f64>,
    price_change_percentage_24h: Option<f64>,
    price_change_percentage_7d: Option<f64>,
    price_change_percentage_30d: Option<f64>,
    circulating_supply: Option<f64>,
    total_supply: Option<f64>,
    max_supply: Option<f64>,
}

// ── Mapping ─────────────────────────────────────────────────────────

impl MarketCoinResponse {
    fn into_coin(self) -> Coin {
        Coin {
            id: self.id,
            name: self.name,
            symbol: self.symbol,
            image: self.image.unwrap_or_default(),
            current_price: self.current_price,
            market_cap: self.market_cap.map(|v| v as i64),
            market_cap_rank: self.market_cap_rank,
            price_change_percentage_24h: self.price_change_percentage_24h,
        }
    }
}

impl SearchCoinResponse {
    // Search matches carry no market data
    fn into_coin(self) -> Coin {
        Coin {
            id: self.id,
            name: self.name,
            symbol: self.symbol,
            image: self.thumb.unwrap_or_default(),
            current_price: None,
            market_cap: None,
            market_cap_rank: self.market_cap_rank,
            price_change_percentage_24h: None,
        }
    }
}

impl TrendingCoinResponse {
    fn into_coin(self, vs_currency: &str) -> Coin {
        let (current_price, change_24h) = match self.data {
            Some(data) => {
                let price = data.price.filter(|_| vs_currency == "usd");
                (price, data.price_change_percentage_24h.get(vs_currency).copied())
            }
            None => (None, None),
        };

        Coin {
            id: self.id,
            name: self.name,
            symbol: self.symbol,
            image: self.small.unwrap_or_default(),
            current_price,
            market_cap: None,
            market_cap_rank: self.market_cap_rank,
            price_change_percentage_24h: change_24h,
        }
    }
}

impl MarketDataResponse {
    fn into_market_data(self, vs_currency: &str) -> MarketData {
        MarketData {
            current_price: self.current_price.get(vs_currency).copied(),
            market_cap: self.market_cap.get(vs_currency).map(|v| *v as i64),
            total_volume: self.total_volume.get(vs_currency).map(|v| *v as i64),
            high_24h: self.high_24h.get(vs_currency).copied(),
            low_24h: self.low_24h.get(vs_currency).copied(),
            price_change_percentage_24h: self.price_change_percentage_24h,
            price_change_percentage_7d: self.price_change_percentage_7d,
            price_change_percentage_30d: self.price_change_percentage_30d,
            circulating_supply: self.circulating_supply,
            total_supply: self.total_supply,
            max_supply: self.max_supply,
        }
    }
}

impl CoinDetailResponse {
    fn into_detail(self, vs_currency: &str) -> CoinDetail {
        CoinDetail {
            id: self.id,
            name: self.name,
            symbol: self.symbol,
            description: self.description.en.as_deref().and_then(clean_description),
            image: self.image.large
                .or(self.image.small)
                .or(self.image.thumb)
                .unwrap_or_default(),
            market_cap_rank: self.market_cap_rank,
            market_data: self.market_data.into_market_data(vs_currency),
            categories: self.categories.into_iter().flatten().collect(),
            genesis_date: self.genesis_date,
        }
    }
}

/// Strip HTML tags, collapse whitespace, and drop blank descriptions.
pub(crate) fn clean_description(raw: &str) -> Option<String> {
    let without_tags = HTML_TAG.replace_all(raw, "");
    let collapsed = WHITESPACE.replace_all(&without_tags, " ");
    let trimmed = collapsed.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ── Implementation ──────────────────────────────────────────────────

impl CoinGeckoClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(ref key) = config.api_key {
            let value = HeaderValue::from_str(key).map_err(|_|
                AppError::Config("COINGECKO_API_KEY contains invalid characters".to_string())
            )?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = reqwest::Client
            ::builder()
            .timeout(config.http_timeout())
            .connect_timeout(config.http_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            vs_currency: config.vs_currency.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("GET {} {:?}", url, query);

        let response = self.client
            .get(&url)
            .query(query)
            .send().await
            .map_err(NetworkError::from)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Catalog returned {} for {}", status, path);
            return Err(NetworkError::from_status(status).into());
        }

        let body = response.json::<T>().await.map_err(NetworkError::from)?;
        Ok(body)
    }
}

#[async_trait]
impl CoinCatalog for CoinGeckoClient {
    async fn list_coins(&self, params: &CoinListParams) -> Result<Vec<Coin>> {
        let query = [
            ("vs_currency", params.vs_currency.clone()),
            ("order", params.sort_order.api_order().to_string()),
            ("per_page", params.per_page.to_string()),
            ("page", params.page.to_string()),
            ("sparkline", "false".to_string()),
            ("price_change_percentage", "24h".to_string()),
        ];

        let coins: Vec<MarketCoinResponse> = self.get_json("coins/markets", &query).await?;
        Ok(coins.into_iter().map(MarketCoinResponse::into_coin).collect())
    }

    async fn search_coins(&self, query: &str) -> Result<Vec<Coin>> {
        let response: SearchResponse = self.get_json(
            "search",
            &[("query", query.to_string())]
        ).await?;

        Ok(response.coins.into_iter().map(SearchCoinResponse::into_coin).collect())
    }

    async fn trending_coins(&self) -> Result<Vec<Coin>> {
        let response: TrendingResponse = self.get_json("search/trending", &[]).await?;

        Ok(
            response.coins
                .into_iter()
                .map(|wrapper| wrapper.item.into_coin(&self.vs_currency))
                .collect()
        )
    }

    async fn coin_detail(&self, coin_id: &str) -> Result<CoinDetail> {
        let path = format!("coins/{}", urlencoding::encode(coin_id));
        let query = [
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("market_data", "true".to_string()),
            ("community_data", "false".to_string()),
            ("developer_data", "false".to_string()),
            ("sparkline", "false".to_string()),
        ];

        let response: CoinDetailResponse = self.get_json(&path, &query).await?;
        Ok(response.into_detail(&self.vs_currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markets_payload_maps_to_coins() {
        let json =
            r#"[
            {
                "id": "bitcoin",
                "symbol": "btc",
                "name": "Bitcoin",
                "image": "https://img/bitcoin.png",
                "current_price": 65000.5,
                "market_cap": 1280000000000,
                "market_cap_rank": 1,
                "price_change_percentage_24h": -1.25,
                "total_volume": 30000000000
            },
            {
                "id": "newcoin",
                "symbol": "new",
                "name": "New Coin",
                "image": "https://img/new.png",
                "current_price": null,
                "market_cap": null,
                "market_cap_rank": null,
                "price_change_percentage_24h": null
            }
        ]"#;

        let parsed: Vec<MarketCoinResponse> = serde_json::from_str(json).unwrap();
        let coins: Vec<Coin> = parsed.into_iter().map(MarketCoinResponse::into_coin).collect();

        assert_eq!(coins.len(), 2);
        assert_eq!(coins[0].id, "bitcoin");
        assert_eq!(coins[0].current_price, Some(65000.5));
        assert_eq!(coins[0].market_cap, Some(1_280_000_000_000));
        assert_eq!(coins[0].market_cap_rank, Some(1));
        assert_eq!(coins[0].price_change_percentage_24h, Some(-1.25));
        assert_eq!(coins[1].current_price, None);
        assert_eq!(coins[1].market_cap_rank, None);
    }

    #[test]
    fn test_search_payload_has_no_market_data() {
        let json =
            r#"{
            "coins": [
                {
                    "id": "bitcoin",
                    "name": "Bitcoin",
                    "api_symbol": "bitcoin",
                    "symbol": "BTC",
                    "market_cap_rank": 1,
                    "thumb": "https://img/btc-thumb.png",
                    "large": "https://img/btc-large.png"
                }
            ],
            "exchanges": [],
            "categories": []
        }"#;

        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        let coin = parsed.coins.into_iter().next().unwrap().into_coin();

        assert_eq!(coin.symbol, "BTC");
        assert_eq!(coin.image, "https://img/btc-thumb.png");
        assert_eq!(coin.market_cap_rank, Some(1));
        assert_eq!(coin.current_price, None);
        assert_eq!(coin.price_change_percentage_24h, None);
    }

    #[test]
    fn test_trending_payload_picks_quote_currency_change() {
        let json =
            r#"{
            "coins": [
                {
                    "item": {
                        "id": "pepe",
                        "coin_id": 29850,
                        "name": "Pepe",
                        "symbol": "PEPE",
                        "market_cap_rank": 30,
                        "thumb": "https://img/pepe-thumb.png",
                        "small": "https://img/pepe-small.png",
                        "data": {
                            "price": 0.0000123,
                            "price_change_percentage_24h": { "usd": 12.5, "eur": 12.1 }
                        }
                    }
                },
                {
                    "item": {
                        "id": "obscure",
                        "name": "Obscure",
                        "symbol": "OBS",
                        "market_cap_rank": null,
                        "small": "https://img/obs-small.png"
                    }
                }
            ]
        }"#;

        let parsed: TrendingResponse = serde_json::from_str(json).unwrap();
        let coins: Vec<Coin> = parsed.coins
            .into_iter()
            .map(|w| w.item.into_coin("usd"))
            .collect();

        assert_eq!(coins[0].image, "https://img/pepe-small.png");
        assert_eq!(coins[0].current_price, Some(0.0000123));
        assert_eq!(coins[0].price_change_percentage_24h, Some(12.5));
        assert_eq!(coins[1].market_cap_rank, None);
        assert_eq!(coins[1].price_change_percentage_24h, None);
    }

    #[test]
    fn test_trending_price_dropped_outside_usd() {
        let json =
            r#"{
            "item": {
                "id": "pepe",
                "name": "Pepe",
                "symbol": "PEPE",
                "market_cap_rank": 30,
                "data": {
                    "price": 0.0000123,
                    "price_change_percentage_24h": { "usd": 12.5, "eur": 12.1 }
                }
            }
        }"#;

        let parsed: TrendingCoinWrapper = serde_json::from_str(json).unwrap();
        let coin = parsed.item.into_coin("eur");

        assert_eq!(coin.current_price, None);
        assert_eq!(coin.price_change_percentage_24h, Some(12.1));
    }

    #[test]
    fn test_detail_payload_maps_market_data() {
        let json =
            r#"{
            "id": "ethereum",
            "symbol": "eth",
            "name": "Ethereum",
            "description": { "en": "<p>Ethereum is a <a href=\"x\">smart contract</a>\n\n platform.</p>" },
            "image": { "thumb": "t.png", "small": "s.png", "large": "l.png" },
            "market_cap_rank": 2,
            "categories": ["Smart Contract Platform", null, "Layer 1 (L1)"],
            "genesis_date": "2015-07-30",
            "market_data": {
                "current_price": { "usd": 3200.25, "eur": 2950.0 },
                "market_cap": { "usd": 385000000000 },
                "total_volume": { "usd": 15000000000 },
                "high_24h": { "usd": 3300.0 },
                "low_24h": { "usd": 3100.0 },
                "price_change_percentage_24h": 1.5,
                "price_change_percentage_7d": -3.2,
                "price_change_percentage_30d": 10.0,
                "circulating_supply": 120000000.0,
                "total_supply": 120000000.0,
                "max_supply": null
            }
        }"#;

        let parsed: CoinDetailResponse = serde_json::from_str(json).unwrap();
        let detail = parsed.into_detail("usd");

        assert_eq!(detail.image, "l.png");
        assert_eq!(detail.description.as_deref(), Some("Ethereum is a smart contract platform."));
        assert_eq!(detail.categories, vec!["Smart Contract Platform", "Layer 1 (L1)"]);
        assert_eq!(detail.market_data.current_price, Some(3200.25));
        assert_eq!(detail.market_data.market_cap, Some(385_000_000_000));
        assert_eq!(detail.market_data.max_supply, None);

        let coin = detail.to_coin();
        assert_eq!(coin.current_price, Some(3200.25));
        assert_eq!(coin.market_cap_rank, Some(2));
        assert_eq!(coin.price_change_percentage_24h, Some(1.5));
    }

    #[test]
    fn test_detail_payload_tolerates_missing_sections() {
        let json = r#"{ "id": "dust", "symbol": "dst", "name": "Dust", "market_cap_rank": null }"#;

        let parsed: CoinDetailResponse = serde_json::from_str(json).unwrap();
        let detail = parsed.into_detail("usd");

        assert_eq!(detail.description, None);
        assert_eq!(detail.image, "");
        assert!(detail.categories.is_empty());
        assert_eq!(detail.market_data, MarketData::default());
    }

    #[test]
    fn test_clean_description() {
        assert_eq!(clean_description("   <br/>  "), None);
        assert_eq!(clean_description(""), None);
        assert_eq!(
            clean_description("<b>Bold</b>\tand\n\nplain").as_deref(),
            Some("Bold and plain")
        );
    }

    #[test]
    fn test_client_rejects_invalid_api_key() {
        let config = Config {
            api_key: Some("bad\nkey".to_string()),
            ..Config::default()
        };

        assert!(matches!(CoinGeckoClient::new(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_url_join_trims_trailing_slash() {
        let config = Config {
            api_base_url: "https://example.test/api/v3/".to_string(),
            ..Config::default()
        };

        let client = CoinGeckoClient::new(&config).unwrap();
        assert_eq!(client.url("search/trending"), "https://example.test/api/v3/search/trending");
    }
}
