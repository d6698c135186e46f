//! View-state actors.
//!
//! Each screen runs as a single tokio task that owns its state. User actions
//! arrive on an unbounded channel, results of background work come back on a
//! second channel, and every change is published as a whole snapshot through
//! a `watch` channel. Dropping the [`Screen`] handle stops the task and
//! aborts whatever it still had in flight.

use std::future::Future;

use tokio::sync::{ mpsc, watch };
use tokio::task::JoinSet;

use crate::error::{ AppError, Result };

pub mod detail;
pub mod favorites;
pub mod home;

pub use detail::{ DetailAction, DetailState };
pub use favorites::{ FavoritesAction, FavoritesState };
pub use home::{ HomeAction, HomeOptions, HomeState };

/// Dismissible error shown by a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorState {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorState {
    fn from(e: &AppError) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

/// Handle to a running screen.
pub struct Screen<A, S> {
    actions: mpsc::UnboundedSender<A>,
    state: watch::Receiver<S>,
}

impl<A, S> Screen<A, S>
    where A: Send + 'static, S: Clone + PartialEq + Send + Sync + 'static
{
    /// Start the actor. Must be called from within a tokio runtime.
    pub(crate) fn spawn<R>(mut reducer: R, initial: S) -> Self
        where R: Reducer<Action = A, State = S>
    {
        let (actions, mut action_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(initial.clone());

        tokio::spawn(async move {
            let (events, mut event_rx) = mpsc::unbounded_channel();
            let mut tasks = Tasks { set: JoinSet::new(), events };
            let mut current = initial;

            reducer.start(&mut current, &mut tasks);
            publish(&state_tx, &current);

            loop {
                tokio::select! {
                    action = action_rx.recv() => match action {
                        Some(action) => reducer.on_action(action, &mut current, &mut tasks),
                        None => break,
                    },
                    Some(event) = event_rx.recv() => {
                        reducer.on_event(event, &mut current, &mut tasks);
                    }
                    Some(joined) = tasks.set.join_next() => {
                        if let Err(e) = joined {
                            if e.is_panic() {
                                tracing::warn!("Screen task panicked: {}", e);
                            }
                        }
                        continue;
                    }
                }

                publish(&state_tx, &current);
            }

            tracing::debug!("Screen stopped, aborting {} pending tasks", tasks.set.len());
        });

        Self { actions, state }
    }

    pub fn dispatch(&self, action: A) -> Result<()> {
        self.actions
            .send(action)
            .map_err(|_| AppError::Internal("Screen has shut down".to_string()))
    }

    /// Latest published state.
    pub fn snapshot(&self) -> S {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.clone()
    }

    /// Stop the screen. Work still in flight is aborted.
    pub fn shutdown(self) {}
}

fn publish<S: Clone + PartialEq>(tx: &watch::Sender<S>, state: &S) {
    tx.send_if_modified(|published| {
        if published == state {
            return false;
        }
        *published = state.clone();
        true
    });
}

/// State transitions of one screen. Handlers run on the actor task and must
/// not block; slow work goes through [`Tasks::run`].
pub(crate) trait Reducer: Send + 'static {
    type Action: Send + 'static;
    type Event: Send + 'static;
    type State: Clone + PartialEq + Send + Sync + 'static;

    fn start(&mut self, _state: &mut Self::State, _tasks: &mut Tasks<Self::Event>) {}

    fn on_action(
        &mut self,
        action: Self::Action,
        state: &mut Self::State,
        tasks: &mut Tasks<Self::Event>
    );

    fn on_event(&mut self, event: Self::Event, state: &mut Self::State, tasks: &mut Tasks<Self::Event>);
}

/// Background work owned by a screen. Everything here is aborted when the
/// screen stops.
pub(crate) struct Tasks<E> {
    set: JoinSet<()>,
    events: mpsc::UnboundedSender<E>,
}

impl<E: Send + 'static> Tasks<E> {
    /// Run `work` in the background and feed its output back as an event.
    pub fn run<F>(&mut self, work: F) where F: Future<Output = E> + Send + 'static {
        let events = self.events.clone();
        self.set.spawn(async move {
            // Closed only while the screen is shutting down
            let _ = events.send(work.await);
        });
    }
}

/// Monotonic request counter for one async slot. Only a result tagged with
/// the current value may touch state.
#[derive(Debug, Default)]
pub(crate) struct Generation(u64);

impl Generation {
    pub fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0 == generation
    }
}
