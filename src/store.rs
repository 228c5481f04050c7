use std::fmt::Debug;
use std::sync::Arc;

use crate::action_sender::ActionSender;
use crate::config::StoreConfig;
use crate::engine::StoreEngine;
use crate::reducer::Reducer;
use crate::store_event::StoreEvent;
use crate::subscription::{ActionSelection, StateSelection};

/// Single owner of a feature's state.
///
/// Every change goes through [`Store::send`]: the reducer runs, the new
/// state is pushed to selectors, and returned effects are started on the
/// tokio runtime the store was created in. Their output comes back through
/// the same mailbox. Dropping the store cancels all effects and ends every
/// selection stream.
pub struct Store<State, Action, Environment>
where
    Action: Debug + Clone + Send + 'static,
    State: PartialEq + Clone + Send + Sync + 'static,
    Environment: Send + Sync + 'static,
{
    engine: Arc<StoreEngine<State, Action, Environment>>,
}

impl<State, Action, Environment> Store<State, Action, Environment>
where
    Action: Debug + Clone + Send + 'static,
    State: PartialEq + Clone + Send + Sync + 'static,
    Environment: Send + Sync + 'static,
{
    /// Must be called from within a tokio runtime.
    pub fn new<R>(state: State, reducer: R, environment: Environment) -> Self
    where
        R: Reducer<State, Action, Environment> + Send + Sync + 'static,
    {
        Self::with_config(state, reducer, environment, StoreConfig::default())
    }

    pub fn with_config<R>(
        state: State,
        reducer: R,
        environment: Environment,
        config: StoreConfig,
    ) -> Self
    where
        R: Reducer<State, Action, Environment> + Send + Sync + 'static,
    {
        let runtime = tokio::runtime::Handle::current();
        let engine = StoreEngine::new(state, reducer, environment, config, runtime);
        log::debug!("[{}] store created", engine.label());
        Self { engine }
    }

    /// Reads the current state. Do not send to this store from `read`.
    pub fn state<T>(&self, read: impl FnOnce(&State) -> T) -> T {
        read(&self.engine.state())
    }

    /// Changes of `projection(state)`, consecutive duplicates removed.
    ///
    /// Nothing is yielded for the state as it is at subscription time.
    pub fn select_state<T, F>(&self, projection: F) -> StateSelection<State, T>
    where
        T: PartialEq + Clone,
        F: Fn(&State) -> T + Send + Sync + 'static,
    {
        // Subscribe while holding the state lock: snapshots are published
        // under it, so the baseline and the first received snapshot line up.
        let state = self.engine.state();
        let baseline = projection(&state);
        let receiver = self.engine.state_subscribers.subscribe();
        drop(state);
        StateSelection::new(receiver, Box::new(projection), baseline)
    }

    /// Every action processed from now on for which `extract` returns `Some`.
    pub fn select_actions<T, F>(&self, extract: F) -> ActionSelection<Action, T>
    where
        F: Fn(&Action) -> Option<T> + Send + Sync + 'static,
    {
        ActionSelection::new(
            self.engine.action_subscribers.subscribe(),
            Box::new(extract),
        )
    }

    pub fn pending_effects(&self) -> usize {
        self.engine.pending_effects()
    }

    /// Resolves once no effect is running. Returns immediately after
    /// shutdown.
    pub async fn idle(&self) {
        let mut in_flight = self.engine.watch_effects();
        // Err means the registry is gone, which only happens on teardown.
        let _ = in_flight.wait_for(|count| *count == 0).await;
    }

    pub fn is_shut_down(&self) -> bool {
        self.engine.is_closed()
    }

    /// Cancels every effect, drops queued actions and ends all selections.
    /// Later sends are ignored.
    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

impl<State, Action, Environment> ActionSender for Store<State, Action, Environment>
where
    Action: Debug + Clone + Send + 'static,
    State: PartialEq + Clone + Send + Sync + 'static,
    Environment: Send + Sync + 'static,
{
    type SendableAction = Action;

    /// Processes `action` before returning, unless this thread is already
    /// inside the store's drain loop, in which case it is queued behind the
    /// events being processed.
    fn send(&self, action: Action) {
        self.engine.deliver(StoreEvent::Action(action));
    }
}

impl<State, Action, Environment> Drop for Store<State, Action, Environment>
where
    Action: Debug + Clone + Send + 'static,
    State: PartialEq + Clone + Send + Sync + 'static,
    Environment: Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.engine.shutdown();
    }
}
