use std::env;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite://midas.db?mode=rwc";
const DEFAULT_API_BASE_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub http_timeout_secs: u64,
    pub vs_currency: String,
    pub coins_per_page: u32,
    pub search_debounce_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let api_base_url = env::var("COINGECKO_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err("COINGECKO_BASE_URL must be an http(s) URL".into());
        }

        // Empty key behaves like no key
        let api_key = env::var("COINGECKO_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let http_timeout_secs: u64 = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?;
        if http_timeout_secs == 0 {
            return Err("HTTP_TIMEOUT_SECS must be greater than zero".into());
        }

        let vs_currency = env::var("VS_CURRENCY")
            .unwrap_or_else(|_| "usd".to_string())
            .to_lowercase();

        let coins_per_page: u32 = env::var("COINS_PER_PAGE")
            .unwrap_or_else(|_| "20".to_string())
            .parse()?;
        if !(1..=250).contains(&coins_per_page) {
            return Err("COINS_PER_PAGE must be between 1 and 250".into());
        }

        let search_debounce_ms = env::var("SEARCH_DEBOUNCE_MS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()?;

        Ok(Config {
            database_url,
            api_base_url,
            api_key,
            http_timeout_secs,
            vs_currency,
            coins_per_page,
            search_debounce_ms,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Quiet period the home screen waits for before searching.
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            http_timeout_secs: 30,
            vs_currency: "usd".to_string(),
            coins_per_page: 20,
            search_debounce_ms: 300,
        }
    }
}
