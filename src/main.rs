use std::sync::Arc;

use anyhow::Context;
use midas::db::{ self, FavoriteRepository };
use midas::providers::CoinGeckoClient;
use midas::screens::{ home, HomeOptions };
use midas::services::{ FavoritesService, MarketService, SearchService, TrendingService };
use midas::Config;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "midas=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()
        .map_err(|e| midas::AppError::Config(e.to_string()))
        .context("failed to load configuration")?;

    tracing::info!("Starting midas against {} ({})", config.api_base_url, config.vs_currency);

    let connection = db::connect(&config.database_url).await.context("failed to open database")?;
    let store = Arc::new(FavoriteRepository::new(connection));

    let catalog = Arc::new(CoinGeckoClient::new(&config)?);

    let market = Arc::new(MarketService::new(catalog.clone()));
    let trending = Arc::new(TrendingService::new(catalog.clone()));
    let search = Arc::new(SearchService::new(catalog.clone()));
    let favorites = Arc::new(FavoritesService::new(store, catalog));

    let screen = home::spawn(market, trending, search, HomeOptions::from_config(&config));
    let mut updates = screen.subscribe();

    tokio::select! {
        loaded = updates.wait_for(|s| !s.is_loading && !s.is_trending_loading) => {
            let state = loaded.context("home screen stopped unexpectedly")?.clone();

            match &state.load_coins_error {
                Some(e) => tracing::warn!("Market listing unavailable: {} ({})", e.message, e.code),
                None => tracing::info!("Loaded {} coins", state.coins.len()),
            }
            match &state.load_trending_error {
                Some(e) => tracing::warn!("Trending unavailable: {} ({})", e.message, e.code),
                None => {
                    for coin in &state.trending_coins {
                        tracing::info!(
                            "Trending: {} ({}) {:+.2}%",
                            coin.name,
                            coin.symbol.to_uppercase(),
                            coin.price_change_percentage_24h.unwrap_or(0.0)
                        );
                    }
                }
            }

            tracing::info!("{} favorites saved", favorites.count().await?);
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted before the first load finished");
        }
    }

    screen.shutdown();
    tracing::info!("Shut down");
    Ok(())
}
