use std::sync::Arc;

use crate::enums::FavoriteAction;
use crate::error::Result;
use crate::models::CoinDetail;
use crate::services::{ DetailService, FavoritesService };

use super::{ ErrorState, Generation, Reducer, Screen, Tasks };

pub type DetailScreen = Screen<DetailAction, DetailState>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailAction {
    Refresh,
    ToggleFavorite,
    DismissError,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailState {
    pub coin_id: String,
    pub coin_detail: Option<CoinDetail>,
    pub is_favorite: bool,
    pub is_loading: bool,
    pub is_favorite_loading: bool,
    pub load_detail_error: Option<ErrorState>,
    pub favorite_error: Option<ErrorState>,
}

/// Start the detail screen for one coin. Detail and favorite membership are
/// fetched right away.
pub fn spawn(
    coin_id: impl Into<String>,
    details: Arc<DetailService>,
    favorites: Arc<FavoritesService>
) -> DetailScreen {
    let reducer = DetailReducer {
        details,
        favorites,
        detail_gen: Generation::default(),
        favorite_gen: Generation::default(),
        toggle_in_flight: false,
    };
    let state = DetailState { coin_id: coin_id.into(), ..DetailState::default() };

    Screen::spawn(reducer, state)
}

enum DetailEvent {
    Detail {
        generation: u64,
        result: Result<CoinDetail>,
    },
    Membership {
        generation: u64,
        result: Result<bool>,
    },
    Toggled {
        generation: u64,
        result: Result<FavoriteAction>,
    },
}

struct DetailReducer {
    details: Arc<DetailService>,
    favorites: Arc<FavoritesService>,
    detail_gen: Generation,
    /// Shared by membership checks and toggles; the newest of either wins
    favorite_gen: Generation,
    /// A membership read issued now could miss the pending write
    toggle_in_flight: bool,
}

impl DetailReducer {
    fn load(&mut self, state: &mut DetailState, tasks: &mut Tasks<DetailEvent>) {
        state.is_loading = true;
        state.is_favorite_loading = true;
        state.load_detail_error = None;

        let generation = self.detail_gen.advance();
        let details = self.details.clone();
        let coin_id = state.coin_id.clone();
        tasks.run(async move {
            DetailEvent::Detail { generation, result: details.get_coin_detail(&coin_id).await }
        });

        if self.toggle_in_flight {
            tracing::debug!("Skipping favorite check for {} while a toggle is pending", state.coin_id);
            return;
        }

        let generation = self.favorite_gen.advance();
        let favorites = self.favorites.clone();
        let coin_id = state.coin_id.clone();
        tasks.run(async move {
            DetailEvent::Membership { generation, result: favorites.is_favorite(&coin_id).await }
        });
    }
}

impl Reducer for DetailReducer {
    type Action = DetailAction;
    type Event = DetailEvent;
    type State = DetailState;

    fn start(&mut self, state: &mut DetailState, tasks: &mut Tasks<DetailEvent>) {
        self.load(state, tasks);
    }

    fn on_action(
        &mut self,
        action: DetailAction,
        state: &mut DetailState,
        tasks: &mut Tasks<DetailEvent>
    ) {
        match action {
            DetailAction::Refresh => self.load(state, tasks),
            DetailAction::ToggleFavorite => {
                let Some(coin) = state.coin_detail.as_ref().map(CoinDetail::to_coin) else {
                    tracing::debug!("Ignoring favorite toggle for {} before detail loaded", state.coin_id);
                    return;
                };

                state.is_favorite_loading = true;
                state.favorite_error = None;
                self.toggle_in_flight = true;

                let generation = self.favorite_gen.advance();
                let favorites = self.favorites.clone();
                tasks.run(async move {
                    DetailEvent::Toggled { generation, result: favorites.toggle(&coin).await }
                });
            }
            DetailAction::DismissError => {
                state.load_detail_error = None;
                state.favorite_error = None;
            }
        }
    }

    fn on_event(&mut self, event: DetailEvent, state: &mut DetailState, _tasks: &mut Tasks<DetailEvent>) {
        match event {
            DetailEvent::Detail { generation, result } => {
                if !self.detail_gen.is_current(generation) {
                    tracing::debug!("Dropping stale detail for {}", state.coin_id);
                    return;
                }

                state.is_loading = false;
                match result {
                    Ok(detail) => {
                        state.coin_detail = Some(detail);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load detail for {}: {}", state.coin_id, e);
                        state.load_detail_error = Some(ErrorState::from(&e));
                    }
                }
            }
            DetailEvent::Membership { generation, result } => {
                if !self.favorite_gen.is_current(generation) {
                    tracing::debug!("Dropping stale favorite check for {}", state.coin_id);
                    return;
                }

                state.is_favorite_loading = false;
                match result {
                    Ok(is_favorite) => {
                        state.is_favorite = is_favorite;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to check favorite {}: {}", state.coin_id, e);
                        state.favorite_error = Some(ErrorState::from(&e));
                    }
                }
            }
            DetailEvent::Toggled { generation, result } => {
                if !self.favorite_gen.is_current(generation) {
                    tracing::debug!("Dropping stale favorite toggle for {}", state.coin_id);
                    return;
                }

                self.toggle_in_flight = false;
                state.is_favorite_loading = false;
                match result {
                    Ok(action) => {
                        state.is_favorite = action == FavoriteAction::Added;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to toggle favorite {}: {}", state.coin_id, e);
                        state.favorite_error = Some(ErrorState::from(&e));
                    }
                }
            }
        }
    }
}
