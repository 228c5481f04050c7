use std::cell::Cell;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use tokio::sync::watch;

use crate::action_sender::{ActionSender, AnyActionSender};
use crate::config::StoreConfig;
use crate::effect::{AsyncActionJob, Effect, EffectValue};
use crate::effect_registry::EffectRegistry;
use crate::reducer::Reducer;
use crate::store_event::{Origin, StoreEvent};
use crate::subscription::Subscribers;

type BoxedReducer<State, Action, Environment> =
    Box<dyn Reducer<State, Action, Environment> + Send + Sync + 'static>;

/// Serializes every transition of one store.
///
/// Events go through a mailbox that is drained by whichever thread holds
/// the drain lock. A send issued while this thread is already draining only
/// enqueues, so effect chains never grow the call stack.
pub(crate) struct StoreEngine<State, Action, Environment>
where
    Action: Send + 'static,
{
    label: String,
    mailbox_alarm: DepthAlarm,
    state: Mutex<State>,
    reducer: BoxedReducer<State, Action, Environment>,
    environment: Environment,
    mailbox: Mutex<VecDeque<StoreEvent<Action>>>,
    draining: ReentrantMutex<Cell<bool>>,
    effects: Mutex<EffectRegistry>,
    pub(crate) state_subscribers: Subscribers<Arc<State>>,
    pub(crate) action_subscribers: Subscribers<Action>,
    runtime: tokio::runtime::Handle,
    closed: AtomicBool,
    this: Weak<Self>,
}

impl<State, Action, Environment> StoreEngine<State, Action, Environment>
where
    State: PartialEq + Clone + Send + Sync + 'static,
    Action: Debug + Clone + Send + 'static,
    Environment: Send + Sync + 'static,
{
    pub(crate) fn new(
        state: State,
        reducer: impl Reducer<State, Action, Environment> + Send + Sync + 'static,
        environment: Environment,
        config: StoreConfig,
        runtime: tokio::runtime::Handle,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            label: config.label,
            mailbox_alarm: DepthAlarm::new(config.mailbox_warn_depth),
            state: Mutex::new(state),
            reducer: Box::new(reducer),
            environment,
            mailbox: Mutex::new(VecDeque::new()),
            draining: ReentrantMutex::new(Cell::new(false)),
            effects: Mutex::new(EffectRegistry::new()),
            state_subscribers: Subscribers::new(),
            action_subscribers: Subscribers::new(),
            runtime,
            closed: AtomicBool::new(false),
            this: this.clone(),
        })
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn state(&self) -> parking_lot::MutexGuard<'_, State> {
        self.state.lock()
    }

    pub(crate) fn pending_effects(&self) -> usize {
        self.effects.lock().len()
    }

    pub(crate) fn watch_effects(&self) -> watch::Receiver<usize> {
        self.effects.lock().watch()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn deliver(&self, event: StoreEvent<Action>) {
        if self.is_closed() {
            log::warn!("[{}] store is shut down, dropping event", self.label);
            return;
        }
        self.mailbox.lock().push_back(event);
        self.drain();
    }

    fn drain(&self) {
        let guard = self.draining.lock();
        if guard.get() {
            // An outer frame on this thread is draining and will pick it up.
            return;
        }
        let _flag = DrainFlag::raise(&guard);

        loop {
            let next = {
                let mut mailbox = self.mailbox.lock();
                if self.mailbox_alarm.observe(mailbox.len()) {
                    log::warn!(
                        "[{}] mailbox holds {} events, is an effect feeding itself?",
                        self.label,
                        mailbox.len()
                    );
                }
                mailbox.pop_front()
            };
            match next {
                Some(event) => self.process(event),
                None => break,
            }
        }
    }

    fn process(&self, event: StoreEvent<Action>) {
        if self.is_closed() {
            return;
        }
        let (action, origin) = event.into_parts();
        if let Some(origin) = origin {
            if !self.effects.lock().is_current(&origin) {
                log::debug!(
                    "[{}] discarding superseded output of {:?}: {:?}",
                    self.label,
                    origin.id,
                    action
                );
                return;
            }
        }

        log::debug!("[{}] handling {:?}", self.label, action);
        self.action_subscribers.publish(&action);

        let effects = {
            let mut state = self.state.lock();
            let state_before = state.clone();
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            if state_before != *state {
                log::trace!(
                    "[{}] state changed, notifying {} subscribers",
                    self.label,
                    self.state_subscribers.len()
                );
                // Published under the state lock so a concurrent subscriber
                // never misses or double-counts this snapshot.
                self.state_subscribers.publish(&Arc::new(state.clone()));
            }
            effects
        };

        for effect in effects {
            self.schedule(effect, None);
        }
    }

    fn schedule(&self, effect: Effect<Action>, origin: Option<Origin>) {
        log::debug!("[{}] scheduling {:?}", self.label, effect.value);
        match effect.value {
            EffectValue::None => {}
            EffectValue::Send(action) => {
                // Keeps the origin so a later cancel can still drop it.
                self.mailbox
                    .lock()
                    .push_back(StoreEvent::EffectOutput { action, origin });
            }
            EffectValue::Async(job) => self.spawn(job, origin),
            EffectValue::Cancellable { id, effect } => {
                let (origin, superseded) = self.effects.lock().supersede(id);
                for handle in superseded {
                    handle.abort();
                }
                self.schedule(*effect, Some(origin));
            }
            EffectValue::Cancel(id) => {
                let cancelled = self.effects.lock().cancel(id);
                for handle in cancelled {
                    handle.abort();
                }
            }
            EffectValue::Merge(effects) => {
                for effect in effects {
                    self.schedule(effect, origin);
                }
            }
        }
    }

    fn spawn(&self, job: AsyncActionJob<Action>, origin: Option<Origin>) {
        let sender = AnyActionSender::new(Box::new(EffectSender {
            engine: self.this.clone(),
            origin,
        }));

        let key = self.effects.lock().next_key();
        let guard = EffectGuard {
            engine: self.this.clone(),
            key,
        };
        let task = self.runtime.spawn(async move {
            let _guard = guard;
            job(sender).await;
        });
        if !self.effects.lock().track(key, task.abort_handle(), origin) {
            task.abort();
        }
    }

    pub(crate) fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let dropped = {
            let mut mailbox = self.mailbox.lock();
            let dropped = mailbox.len();
            mailbox.clear();
            dropped
        };
        let handles = self.effects.lock().take_all();
        log::debug!(
            "[{}] shutting down: cancelling {} effects, dropping {} queued events",
            self.label,
            handles.len(),
            dropped
        );
        for handle in handles {
            handle.abort();
        }
        self.state_subscribers.close();
        self.action_subscribers.close();
    }
}

/// Fires once when the observed depth rises above `threshold`, and rearms
/// once it is back at or below it.
struct DepthAlarm {
    threshold: usize,
    raised: AtomicBool,
}

impl DepthAlarm {
    fn new(threshold: usize) -> Self {
        Self {
            threshold,
            raised: AtomicBool::new(false),
        }
    }

    fn observe(&self, depth: usize) -> bool {
        if depth > self.threshold {
            !self.raised.swap(true, Ordering::Relaxed)
        } else {
            self.raised.store(false, Ordering::Relaxed);
            false
        }
    }
}

struct DrainFlag<'a>(&'a Cell<bool>);

impl<'a> DrainFlag<'a> {
    fn raise(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for DrainFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Handed to effect jobs. Holds the engine weakly: an effect never keeps
/// its store alive.
struct EffectSender<State, Action, Environment>
where
    Action: Send + 'static,
{
    engine: Weak<StoreEngine<State, Action, Environment>>,
    origin: Option<Origin>,
}

impl<State, Action, Environment> ActionSender for EffectSender<State, Action, Environment>
where
    State: PartialEq + Clone + Send + Sync + 'static,
    Action: Debug + Clone + Send + 'static,
    Environment: Send + Sync + 'static,
{
    type SendableAction = Action;

    fn send(&self, action: Action) {
        if let Some(engine) = self.engine.upgrade() {
            engine.deliver(StoreEvent::EffectOutput {
                action,
                origin: self.origin,
            });
        }
    }
}

struct EffectGuard<State, Action, Environment>
where
    Action: Send + 'static,
{
    engine: Weak<StoreEngine<State, Action, Environment>>,
    key: u64,
}

impl<State, Action, Environment> Drop for EffectGuard<State, Action, Environment>
where
    Action: Send + 'static,
{
    fn drop(&mut self) {
        if let Some(engine) = self.engine.upgrade() {
            engine.effects.lock().finish(self.key);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    #[derive(Default, Clone, PartialEq, Debug)]
    struct State {
        log: Vec<u32>,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Action {
        Chain(u32),
        Record(u32),
    }

    fn reducer(state: &mut State, action: Action, _env: &()) -> Vec<Effect<Action>> {
        match action {
            Action::Chain(0) => vec![],
            Action::Chain(n) => vec![
                Effect::send(Action::Record(n)),
                Effect::send(Action::Chain(n - 1)),
            ],
            Action::Record(n) => {
                state.log.push(n);
                vec![]
            }
        }
    }

    fn engine() -> Arc<StoreEngine<State, Action, ()>> {
        StoreEngine::new(
            State::default(),
            reducer,
            (),
            StoreConfig::default().with_label("engine-test"),
            tokio::runtime::Handle::current(),
        )
    }

    #[tokio::test]
    async fn test_synchronous_effects_drain_in_order() {
        let engine = engine();
        engine.deliver(StoreEvent::Action(Action::Chain(3)));
        assert_eq!(engine.state().log, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_long_synchronous_chain_does_not_recurse() {
        let engine = engine();
        engine.deliver(StoreEvent::Action(Action::Chain(10_000)));
        let state = engine.state();
        assert_eq!(state.log.len(), 10_000);
        assert_eq!(state.log.first(), Some(&10_000));
        assert_eq!(state.log.last(), Some(&1));
    }

    #[tokio::test]
    async fn test_events_after_shutdown_are_dropped() {
        let engine = engine();
        engine.shutdown();
        engine.deliver(StoreEvent::Action(Action::Record(1)));
        assert!(engine.state().log.is_empty());
        assert!(engine.is_closed());
    }

    #[tokio::test]
    async fn test_superseded_output_is_discarded() {
        let engine = engine();
        let id = crate::effect::CancelId::new("record");
        let (stale, _) = engine.effects.lock().supersede(id);
        let (current, _) = engine.effects.lock().supersede(id);

        engine.deliver(StoreEvent::EffectOutput {
            action: Action::Record(1),
            origin: Some(stale),
        });
        engine.deliver(StoreEvent::EffectOutput {
            action: Action::Record(2),
            origin: Some(current),
        });
        assert_eq!(engine.state().log, vec![2]);
    }

    #[test]
    fn test_depth_alarm_fires_once_per_crossing() {
        let alarm = DepthAlarm::new(3);
        assert!(!alarm.observe(3));
        assert!(alarm.observe(4));
        assert!(!alarm.observe(5));
        assert!(!alarm.observe(4));
        assert!(!alarm.observe(2));
        assert!(alarm.observe(4));
    }

    #[tokio::test]
    async fn test_effect_guard_reports_completion() {
        let engine = engine();
        engine.schedule(
            Effect::future(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Some(Action::Record(9))
            }),
            None,
        );
        assert_eq!(engine.pending_effects(), 1);
        let mut rx = engine.watch_effects();
        rx.wait_for(|n| *n == 0).await.unwrap();
        assert_eq!(engine.state().log, vec![9]);
    }
}
