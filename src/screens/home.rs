use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::models::Coin;
use crate::providers::CoinListParams;
use crate::services::search_service::{ normalize_query, MIN_SEARCH_LENGTH };
use crate::services::{ MarketService, SearchService, TrendingService };

use super::{ ErrorState, Generation, Reducer, Screen, Tasks };

pub type HomeScreen = Screen<HomeAction, HomeState>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeAction {
    Load,
    Refresh,
    Retry,
    SearchQueryChanged(String),
    ClearSearch,
    DismissError,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeState {
    pub coins: Vec<Coin>,
    pub trending_coins: Vec<Coin>,
    /// Raw text as typed
    pub search_query: String,
    pub search_results: Vec<Coin>,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub is_trending_loading: bool,
    pub is_searching: bool,
    pub load_coins_error: Option<ErrorState>,
    pub load_trending_error: Option<ErrorState>,
    pub search_error: Option<ErrorState>,
}

#[derive(Debug, Clone)]
pub struct HomeOptions {
    pub list_params: CoinListParams,
    pub search_debounce: Duration,
}

impl HomeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            list_params: CoinListParams {
                vs_currency: config.vs_currency.clone(),
                per_page: config.coins_per_page,
                ..CoinListParams::default()
            },
            search_debounce: config.search_debounce(),
        }
    }
}

impl Default for HomeOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Start the home screen. The first load begins immediately.
pub fn spawn(
    market: Arc<MarketService>,
    trending: Arc<TrendingService>,
    search: Arc<SearchService>,
    options: HomeOptions
) -> HomeScreen {
    let reducer = HomeReducer {
        market,
        trending,
        search,
        options,
        coins_gen: Generation::default(),
        trending_gen: Generation::default(),
        debounce_gen: Generation::default(),
        search_gen: Generation::default(),
        last_searched: None,
    };

    Screen::spawn(reducer, HomeState::default())
}

enum HomeEvent {
    Coins {
        generation: u64,
        result: Result<Vec<Coin>>,
    },
    Trending {
        generation: u64,
        result: Result<Vec<Coin>>,
    },
    QuietPeriodElapsed {
        generation: u64,
    },
    SearchResults {
        generation: u64,
        query: String,
        result: Result<Vec<Coin>>,
    },
}

struct HomeReducer {
    market: Arc<MarketService>,
    trending: Arc<TrendingService>,
    search: Arc<SearchService>,
    options: HomeOptions,
    coins_gen: Generation,
    trending_gen: Generation,
    /// Bumped by every keystroke
    debounce_gen: Generation,
    /// Bumped only when a query is acted on
    search_gen: Generation,
    last_searched: Option<String>,
}

impl HomeReducer {
    fn load(&mut self, state: &mut HomeState, tasks: &mut Tasks<HomeEvent>, refreshing: bool) {
        if refreshing {
            state.is_refreshing = true;
        } else {
            state.is_loading = true;
        }
        state.is_trending_loading = true;
        state.load_coins_error = None;
        state.load_trending_error = None;

        let generation = self.coins_gen.advance();
        let market = self.market.clone();
        let params = self.options.list_params.clone();
        tasks.run(async move {
            HomeEvent::Coins { generation, result: market.get_coins(params).await }
        });

        let generation = self.trending_gen.advance();
        let trending = self.trending.clone();
        tasks.run(async move {
            HomeEvent::Trending { generation, result: trending.trending().await }
        });
    }

    fn search_if_changed(&mut self, state: &mut HomeState, tasks: &mut Tasks<HomeEvent>) {
        let query = normalize_query(&state.search_query);
        if self.last_searched.as_deref() == Some(query.as_str()) {
            return;
        }
        self.last_searched = Some(query.clone());

        let generation = self.search_gen.advance();

        if query.chars().count() < MIN_SEARCH_LENGTH {
            state.search_results.clear();
            state.is_searching = false;
            state.search_error = None;
            return;
        }

        state.is_searching = true;
        state.search_error = None;

        let search = self.search.clone();
        tasks.run(async move {
            let result = search.search(&query).await;
            HomeEvent::SearchResults { generation, query, result }
        });
    }
}

impl Reducer for HomeReducer {
    type Action = HomeAction;
    type Event = HomeEvent;
    type State = HomeState;

    fn start(&mut self, state: &mut HomeState, tasks: &mut Tasks<HomeEvent>) {
        self.load(state, tasks, false);
    }

    fn on_action(&mut self, action: HomeAction, state: &mut HomeState, tasks: &mut Tasks<HomeEvent>) {
        match action {
            HomeAction::Load | HomeAction::Retry => self.load(state, tasks, false),
            HomeAction::Refresh => self.load(state, tasks, true),
            HomeAction::SearchQueryChanged(query) => {
                state.search_query = query;

                let generation = self.debounce_gen.advance();
                let quiet = self.options.search_debounce;
                tasks.run(async move {
                    tokio::time::sleep(quiet).await;
                    HomeEvent::QuietPeriodElapsed { generation }
                });
            }
            HomeAction::ClearSearch => {
                self.debounce_gen.advance();
                self.search_gen.advance();
                self.last_searched = None;

                state.search_query.clear();
                state.search_results.clear();
                state.is_searching = false;
                state.search_error = None;
            }
            HomeAction::DismissError => {
                state.load_coins_error = None;
                state.load_trending_error = None;
                state.search_error = None;
            }
        }
    }

    fn on_event(&mut self, event: HomeEvent, state: &mut HomeState, tasks: &mut Tasks<HomeEvent>) {
        match event {
            HomeEvent::Coins { generation, result } => {
                if !self.coins_gen.is_current(generation) {
                    tracing::debug!("Dropping stale coin list (generation {})", generation);
                    return;
                }

                state.is_loading = false;
                state.is_refreshing = false;
                match result {
                    Ok(coins) => {
                        state.coins = coins;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load coins: {}", e);
                        state.load_coins_error = Some(ErrorState::from(&e));
                    }
                }
            }
            HomeEvent::Trending { generation, result } => {
                if !self.trending_gen.is_current(generation) {
                    tracing::debug!("Dropping stale trending list (generation {})", generation);
                    return;
                }

                state.is_trending_loading = false;
                match result {
                    Ok(coins) => {
                        state.trending_coins = coins;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load trending coins: {}", e);
                        state.load_trending_error = Some(ErrorState::from(&e));
                    }
                }
            }
            HomeEvent::QuietPeriodElapsed { generation } => {
                if self.debounce_gen.is_current(generation) {
                    self.search_if_changed(state, tasks);
                }
            }
            HomeEvent::SearchResults { generation, query, result } => {
                if !self.search_gen.is_current(generation) {
                    tracing::debug!("Dropping stale results for '{}'", query);
                    return;
                }

                state.is_searching = false;
                match result {
                    Ok(coins) => {
                        state.search_results = coins;
                    }
                    Err(e) => {
                        tracing::warn!("Search for '{}' failed: {}", query, e);
                        state.search_results.clear();
                        state.search_error = Some(ErrorState::from(&e));
                    }
                }
            }
        }
    }
}
