pub mod catalog;
pub mod coingecko;

pub use catalog::{ CoinCatalog, CoinListParams };
pub use coingecko::CoinGeckoClient;
