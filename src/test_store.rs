//! Step-by-step reducer assertions.
//!
//! A [`TestStore`] runs a reducer without a live [`crate::Store`]: every
//! `send` and `receive` states exactly how the state must change, and effect
//! output has to be received explicitly, in order.
//!
//! ```ignore
//! let mut store = TestStore::new(ShopState::default(), ShopReducer, env);
//! store.send(ShopAction::ShopNameDidChange("my shop".into()), |s| {
//!     s.shop_name = Some("my shop".into());
//! });
//! store
//!     .receive(ShopAction::DidValidateShopName(response), |s| {
//!         s.selected_domain_name = Some("foo".into());
//!     })
//!     .await;
//! store.finish().await;
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::{AbortHandle, JoinSet};

use crate::action_sender::{AnyActionSender, ChannelSender};
use crate::effect::{CancelId, Effect, EffectValue};
use crate::reducer::Reducer;
use crate::store_event::{Origin, StoreEvent};

pub struct TestStore<State, Action, Environment, R>
where
    Action: Send + 'static,
{
    state: State,
    reducer: R,
    environment: Environment,
    tx: UnboundedSender<StoreEvent<Action>>,
    received: UnboundedReceiver<StoreEvent<Action>>,
    tasks: JoinSet<()>,
    cancellables: HashMap<CancelId, Vec<AbortHandle>>,
    generations: HashMap<CancelId, u64>,
    timeout: Duration,
}

impl<State, Action, Environment, R> TestStore<State, Action, Environment, R>
where
    State: Clone + PartialEq + Debug,
    Action: Clone + PartialEq + Debug + Send + 'static,
    R: Reducer<State, Action, Environment>,
{
    pub fn new(state: State, reducer: R, environment: Environment) -> Self {
        let (tx, received) = unbounded_channel();
        Self {
            state,
            reducer,
            environment,
            tx,
            received,
            tasks: JoinSet::new(),
            cancellables: HashMap::new(),
            generations: HashMap::new(),
            timeout: Duration::from_secs(1),
        }
    }

    /// How long `receive` and `finish` wait for effects. Defaults to one
    /// second.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Sends a user action and asserts the resulting state equals the
    /// previous state with `update` applied.
    ///
    /// # Panics
    ///
    /// If effect output is waiting to be received, or the state differs.
    #[track_caller]
    pub fn send(&mut self, action: Action, update: impl FnOnce(&mut State)) {
        if let Some(unreceived) = self.try_next() {
            panic!("must receive {:?} before sending {:?}", unreceived, action);
        }
        self.step(action, update);
    }

    /// Waits for the next action produced by an effect, asserts it equals
    /// `expected`, reduces it, and checks the state like [`Self::send`].
    ///
    /// # Panics
    ///
    /// If no action arrives within the timeout, a different one arrives, or
    /// the state differs.
    pub async fn receive(&mut self, expected: Action, update: impl FnOnce(&mut State)) {
        let deadline = tokio::time::Instant::now() + self.timeout;
        let action = loop {
            match tokio::time::timeout_at(deadline, self.received.recv()).await {
                Ok(Some(event)) => {
                    if let Some(action) = self.current(event) {
                        break action;
                    }
                }
                Ok(None) => unreachable!("test store holds its own sender"),
                Err(_) => panic!("expected to receive {:?}, nothing arrived", expected),
            }
        };
        assert_eq!(action, expected, "received an unexpected action");
        self.step(action, update);
    }

    /// Waits for every running effect, then asserts nothing is left to
    /// receive.
    ///
    /// # Panics
    ///
    /// If effects are still running after the timeout, or output is
    /// unreceived.
    pub async fn finish(mut self) {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            match tokio::time::timeout_at(deadline, self.tasks.join_next()).await {
                Ok(None) => break,
                Ok(Some(Ok(()))) => {}
                Ok(Some(Err(error))) => {
                    if error.is_panic() {
                        std::panic::resume_unwind(error.into_panic());
                    }
                }
                Err(_) => panic!(
                    "{} effects still running after {:?}",
                    self.tasks.len(),
                    self.timeout
                ),
            }
        }
        if let Some(unreceived) = self.try_next() {
            panic!("unreceived action {:?}", unreceived);
        }
    }

    #[track_caller]
    fn step(&mut self, action: Action, update: impl FnOnce(&mut State)) {
        let mut expected = self.state.clone();
        update(&mut expected);
        let effects = self
            .reducer
            .reduce(&mut self.state, action, &self.environment);
        assert_eq!(self.state, expected, "state after action does not match");
        for effect in effects {
            self.schedule(effect, None);
        }
    }

    fn schedule(&mut self, effect: Effect<Action>, origin: Option<Origin>) {
        match effect.value {
            EffectValue::None => {}
            EffectValue::Send(action) => {
                // The receiver lives in `self`, so this cannot fail.
                let _ = self.tx.send(StoreEvent::EffectOutput { action, origin });
            }
            EffectValue::Async(job) => {
                let sender = ChannelSender::new(self.tx.clone(), origin);
                let handle = self.tasks.spawn(job(AnyActionSender::new(Box::new(sender))));
                if let Some(origin) = origin {
                    self.cancellables.entry(origin.id).or_default().push(handle);
                }
            }
            EffectValue::Cancellable { id, effect } => {
                let origin = self.cancel(id);
                self.schedule(*effect, Some(origin));
            }
            EffectValue::Cancel(id) => {
                self.cancel(id);
            }
            EffectValue::Merge(effects) => {
                for effect in effects {
                    self.schedule(effect, origin);
                }
            }
        }
    }

    /// Aborts everything running under `id` and makes its queued output
    /// stale. Returns the origin for whatever is registered next.
    fn cancel(&mut self, id: CancelId) -> Origin {
        for handle in self.cancellables.remove(&id).unwrap_or_default() {
            handle.abort();
        }
        let generation = self.generations.entry(id).or_default();
        *generation += 1;
        Origin {
            id,
            generation: *generation,
        }
    }

    fn current(&self, event: StoreEvent<Action>) -> Option<Action> {
        match event.into_parts() {
            (_, Some(origin))
                if self.generations.get(&origin.id) != Some(&origin.generation) =>
            {
                None
            }
            (action, _) => Some(action),
        }
    }

    fn try_next(&mut self) -> Option<Action> {
        while let Ok(event) = self.received.try_recv() {
            if let Some(action) = self.current(event) {
                return Some(action);
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct State {
        total: u32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Action {
        Add(u32),
        AddLater(u32),
        Added(u32),
        Twice(u32),
        AddThenCancel(u32),
        AddTwice(u32, u32),
    }

    fn reducer(state: &mut State, action: Action, _env: &()) -> Vec<Effect<Action>> {
        match action {
            Action::Add(n) | Action::Added(n) => {
                state.total += n;
                vec![]
            }
            Action::AddLater(n) => vec![Effect::future(async move { Some(Action::Added(n)) })],
            Action::Twice(n) => vec![Effect::merge(vec![
                Effect::send(Action::Added(n)),
                Effect::send(Action::Added(n)),
            ])],
            Action::AddThenCancel(n) => vec![
                Effect::send(Action::Added(n)).cancellable("add"),
                Effect::cancel("add"),
            ],
            Action::AddTwice(first, second) => vec![
                Effect::send(Action::Added(first)).cancellable("add"),
                Effect::send(Action::Added(second)).cancellable("add"),
            ],
        }
    }

    #[tokio::test]
    async fn test_send_and_receive() {
        let mut store = TestStore::new(State::default(), reducer, ());
        store.send(Action::Add(1), |s| s.total = 1);
        store.send(Action::AddLater(2), |_| {});
        store.receive(Action::Added(2), |s| s.total = 3).await;
        store.finish().await;
    }

    #[tokio::test]
    async fn test_merged_effects_arrive_in_order() {
        let mut store = TestStore::new(State::default(), reducer, ());
        store.send(Action::Twice(5), |_| {});
        store.receive(Action::Added(5), |s| s.total = 5).await;
        store.receive(Action::Added(5), |s| s.total = 10).await;
        store.finish().await;
    }

    #[tokio::test]
    async fn test_cancelled_send_is_never_received() {
        let mut store = TestStore::new(State::default(), reducer, ());
        store.send(Action::AddThenCancel(1), |_| {});
        store.send(Action::AddTwice(1, 2), |_| {});
        store.receive(Action::Added(2), |s| s.total = 2).await;
        store.finish().await;
    }

    #[tokio::test]
    #[should_panic(expected = "state after action does not match")]
    async fn test_wrong_state_update_panics() {
        let mut store = TestStore::new(State::default(), reducer, ());
        store.send(Action::Add(1), |s| s.total = 2);
    }

    #[tokio::test]
    #[should_panic(expected = "unreceived action")]
    async fn test_finish_with_unreceived_action_panics() {
        let mut store = TestStore::new(State::default(), reducer, ());
        store.send(Action::AddLater(1), |_| {});
        store.finish().await;
    }

    #[tokio::test]
    #[should_panic(expected = "must receive")]
    async fn test_send_before_receive_panics() {
        let mut store = TestStore::new(State::default(), reducer, ());
        store.send(Action::Twice(1), |_| {});
        store.send(Action::Add(1), |_| {});
    }
}
