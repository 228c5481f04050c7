use std::collections::{HashMap, HashSet};

use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::effect::CancelId;
use crate::store_event::Origin;

/// Bookkeeping for running effect tasks and their cancellation ids.
///
/// Every mutation publishes the number of running tasks so callers can wait
/// for the store to go idle. Handles that must be aborted are returned
/// instead of aborted in place: an aborted task drops its guard, and the
/// guard locks the registry.
///
/// Tasks are spawned outside the lock, so a short task may report
/// completion before it is tracked; such keys are remembered in
/// `finished_early` and never tracked.
pub(crate) struct EffectRegistry {
    next_key: u64,
    tasks: HashMap<u64, AbortHandle>,
    untracked: HashSet<u64>,
    finished_early: HashSet<u64>,
    slots: HashMap<CancelId, Slot>,
    in_flight: watch::Sender<usize>,
    closed: bool,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    tasks: Vec<u64>,
}

impl EffectRegistry {
    pub(crate) fn new() -> Self {
        let (in_flight, _) = watch::channel(0);
        Self {
            next_key: 0,
            tasks: HashMap::new(),
            untracked: HashSet::new(),
            finished_early: HashSet::new(),
            slots: HashMap::new(),
            in_flight,
            closed: false,
        }
    }

    pub(crate) fn next_key(&mut self) -> u64 {
        self.next_key += 1;
        self.untracked.insert(self.next_key);
        self.next_key
    }

    /// Returns `false` when the registry is closed; the caller must abort
    /// the task itself.
    pub(crate) fn track(&mut self, key: u64, handle: AbortHandle, origin: Option<Origin>) -> bool {
        self.untracked.remove(&key);
        if self.closed {
            return false;
        }
        if self.finished_early.remove(&key) {
            return true;
        }
        if let Some(origin) = origin {
            self.slots.entry(origin.id).or_default().tasks.push(key);
        }
        self.tasks.insert(key, handle);
        self.publish();
        true
    }

    pub(crate) fn finish(&mut self, key: u64) {
        if self.tasks.remove(&key).is_some() {
            self.publish();
        } else if self.untracked.contains(&key) {
            self.finished_early.insert(key);
        }
    }

    /// Starts a new generation for `id`. Output tagged with an older
    /// generation is stale from now on.
    pub(crate) fn supersede(&mut self, id: CancelId) -> (Origin, Vec<AbortHandle>) {
        let slot = self.slots.entry(id).or_default();
        slot.generation += 1;
        let origin = Origin {
            id,
            generation: slot.generation,
        };
        let keys = std::mem::take(&mut slot.tasks);
        let handles = self.remove_tasks(keys);
        (origin, handles)
    }

    pub(crate) fn cancel(&mut self, id: CancelId) -> Vec<AbortHandle> {
        match self.slots.get_mut(&id) {
            Some(slot) => {
                slot.generation += 1;
                let keys = std::mem::take(&mut slot.tasks);
                self.remove_tasks(keys)
            }
            None => Vec::new(),
        }
    }

    pub(crate) fn is_current(&self, origin: &Origin) -> bool {
        self.slots
            .get(&origin.id)
            .is_some_and(|slot| slot.generation == origin.generation)
    }

    pub(crate) fn take_all(&mut self) -> Vec<AbortHandle> {
        self.closed = true;
        self.untracked.clear();
        self.finished_early.clear();
        for slot in self.slots.values_mut() {
            slot.generation += 1;
            slot.tasks.clear();
        }
        let handles = self.tasks.drain().map(|(_, handle)| handle).collect();
        self.publish();
        handles
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn watch(&self) -> watch::Receiver<usize> {
        self.in_flight.subscribe()
    }

    fn remove_tasks(&mut self, keys: Vec<u64>) -> Vec<AbortHandle> {
        let handles: Vec<_> = keys
            .into_iter()
            .filter_map(|key| self.tasks.remove(&key))
            .collect();
        if !handles.is_empty() {
            self.publish();
        }
        handles
    }

    fn publish(&self) {
        self.in_flight.send_replace(self.tasks.len());
    }
}
