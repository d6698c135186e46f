use std::sync::Arc;

use crate::enums::SortOrder;
use crate::error::Result;
use crate::models::Coin;
use crate::services::FavoritesService;

use super::{ ErrorState, Generation, Reducer, Screen, Tasks };

pub type FavoritesScreen = Screen<FavoritesAction, FavoritesState>;

#[derive(Debug, Clone, PartialEq)]
pub enum FavoritesAction {
    Load,
    ChangeSortOrder(Option<SortOrder>),
    RemoveFavorite(String),
    ToggleFavorite(Coin),
    ClearAll,
    DismissError,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FavoritesState {
    pub favorites: Vec<Coin>,
    pub sort_order: Option<SortOrder>,
    pub is_loading: bool,
    pub is_favorite_loading: bool,
    pub error: Option<ErrorState>,
    pub favorite_error: Option<ErrorState>,
}

/// Start the favorites screen. The list loads immediately in `sort_order`.
pub fn spawn(favorites: Arc<FavoritesService>, sort_order: Option<SortOrder>) -> FavoritesScreen {
    let reducer = FavoritesReducer {
        favorites,
        load_gen: Generation::default(),
        mutation_gen: Generation::default(),
    };
    let state = FavoritesState { sort_order, ..FavoritesState::default() };

    Screen::spawn(reducer, state)
}

enum FavoritesEvent {
    Loaded {
        generation: u64,
        result: Result<Vec<Coin>>,
    },
    Changed {
        generation: u64,
        result: Result<()>,
    },
    Cleared {
        generation: u64,
        result: Result<()>,
    },
}

struct FavoritesReducer {
    favorites: Arc<FavoritesService>,
    load_gen: Generation,
    mutation_gen: Generation,
}

impl FavoritesReducer {
    fn load(&mut self, state: &mut FavoritesState, tasks: &mut Tasks<FavoritesEvent>) {
        state.is_loading = true;
        state.error = None;

        let generation = self.load_gen.advance();
        let favorites = self.favorites.clone();
        let order = state.sort_order;
        tasks.run(async move {
            FavoritesEvent::Loaded { generation, result: favorites.get_favorites(order).await }
        });
    }

    fn begin_mutation(&mut self, state: &mut FavoritesState) -> u64 {
        state.is_favorite_loading = true;
        state.favorite_error = None;
        self.mutation_gen.advance()
    }

    /// A successful write changed the store whichever mutation it was, so it
    /// always reloads. Only the latest mutation owns the busy flag and the
    /// error slot.
    fn finish_mutation(
        &mut self,
        generation: u64,
        result: Result<()>,
        state: &mut FavoritesState,
        tasks: &mut Tasks<FavoritesEvent>
    ) {
        let current = self.mutation_gen.is_current(generation);
        if current {
            state.is_favorite_loading = false;
        }

        match result {
            Ok(()) => self.load(state, tasks),
            Err(e) => {
                tracing::warn!("Failed to update favorites: {}", e);
                if current {
                    state.favorite_error = Some(ErrorState::from(&e));
                }
            }
        }
    }
}

impl Reducer for FavoritesReducer {
    type Action = FavoritesAction;
    type Event = FavoritesEvent;
    type State = FavoritesState;

    fn start(&mut self, state: &mut FavoritesState, tasks: &mut Tasks<FavoritesEvent>) {
        self.load(state, tasks);
    }

    fn on_action(
        &mut self,
        action: FavoritesAction,
        state: &mut FavoritesState,
        tasks: &mut Tasks<FavoritesEvent>
    ) {
        match action {
            FavoritesAction::Load => self.load(state, tasks),
            FavoritesAction::ChangeSortOrder(order) => {
                state.sort_order = order;
                self.load(state, tasks);
            }
            FavoritesAction::RemoveFavorite(coin_id) => {
                let generation = self.begin_mutation(state);
                let favorites = self.favorites.clone();
                tasks.run(async move {
                    FavoritesEvent::Changed { generation, result: favorites.remove(&coin_id).await }
                });
            }
            FavoritesAction::ToggleFavorite(coin) => {
                let generation = self.begin_mutation(state);
                let favorites = self.favorites.clone();
                tasks.run(async move {
                    let result = favorites.toggle(&coin).await.map(|_| ());
                    FavoritesEvent::Changed { generation, result }
                });
            }
            FavoritesAction::ClearAll => {
                let generation = self.begin_mutation(state);
                let favorites = self.favorites.clone();
                tasks.run(async move {
                    FavoritesEvent::Cleared { generation, result: favorites.clear_all().await }
                });
            }
            FavoritesAction::DismissError => {
                state.error = None;
                state.favorite_error = None;
            }
        }
    }

    fn on_event(
        &mut self,
        event: FavoritesEvent,
        state: &mut FavoritesState,
        tasks: &mut Tasks<FavoritesEvent>
    ) {
        match event {
            FavoritesEvent::Loaded { generation, result } => {
                if !self.load_gen.is_current(generation) {
                    tracing::debug!("Dropping stale favorites list (generation {})", generation);
                    return;
                }

                state.is_loading = false;
                match result {
                    Ok(favorites) => {
                        state.favorites = favorites;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load favorites: {}", e);
                        state.error = Some(ErrorState::from(&e));
                    }
                }
            }
            FavoritesEvent::Changed { generation, result } => {
                self.finish_mutation(generation, result, state, tasks);
            }
            FavoritesEvent::Cleared { generation, result } => {
                if result.is_ok() {
                    state.favorites.clear();
                }
                self.finish_mutation(generation, result, state, tasks);
            }
        }
    }
}
