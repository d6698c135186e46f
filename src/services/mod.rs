pub mod detail_service;
pub mod favorites_service;
pub mod market_service;
pub mod search_service;
pub mod trending_service;

pub use detail_service::DetailService;
pub use favorites_service::{ sort_coins, FavoritesService };
pub use market_service::MarketService;
pub use search_service::SearchService;
pub use trending_service::TrendingService;
