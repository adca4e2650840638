//! # Gatecheck Runtime
//!
//! Runtime implementation for gatecheck reducers.
//!
//! The [`Store`] owns a reducer's state, runs the reducer for each action and
//! executes the returned effects, feeding any action an effect produces back
//! into the reducer.
//!
//! ## Execution Model
//!
//! Effects run on the calling task, one after another. The state lock is
//! released before any effect is awaited, so a second `send()` issued while a
//! store call is in flight sees the state the reducer left behind (for
//! example an in-flight guard flag) instead of blocking on the lock.
//!
//! ## Example
//!
//! ```ignore
//! use gatecheck_runtime::Store;
//!
//! let store = Store::new(StationState::default(), StationReducer::new(), environment);
//!
//! // Send an action and run everything it triggers
//! store.send(StationAction::Scan { raw }).await;
//!
//! // Read state
//! let outcome = store.state(|s| s.outcome.clone()).await;
//! ```

use gatecheck_core::{effect::Effect, reducer::Reducer};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The Store - runtime coordinator for a reducer
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
        }
    }

    /// Send an action to the store
    ///
    /// 1. Acquires the write lock and calls the reducer
    /// 2. Releases the lock
    /// 3. Executes the returned effects in order
    /// 4. Actions produced by effects are reduced the same way (feedback loop)
    ///
    /// Returns once every effect triggered by `action` (directly or through
    /// feedback) has completed.
    ///
    /// # Returns
    ///
    /// The number of actions reduced, including `action` itself.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> usize {
        let mut queue = VecDeque::from([action]);
        let mut reduced = 0;

        while let Some(action) = queue.pop_front() {
            let effects = {
                let mut state = self.state.write().await;
                self.reducer.reduce(&mut state, action, &self.environment)
            };
            reduced += 1;

            for effect in effects {
                if let Some(next) = Self::execute_effect(effect).await {
                    queue.push_back(next);
                }
            }
        }

        reduced
    }

    /// Read the current state through a closure
    ///
    /// # Returns
    ///
    /// The value returned by the closure
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    async fn execute_effect(effect: Effect<A>) -> Option<A> {
        match effect {
            Effect::None => {
                tracing::trace!("Executing Effect::None (no-op)");
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                None
            },
            Effect::Future(fut) => {
                tracing::trace!("Executing Effect::Future");
                metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                let action = fut.await;
                if action.is_none() {
                    tracing::trace!("Effect::Future completed with no action");
                }
                action
            },
        }
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
        }
    }
}
