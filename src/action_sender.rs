use tokio::sync::mpsc::UnboundedSender;

use crate::store_event::{Origin, StoreEvent};

pub trait ActionSender: Send {
    type SendableAction;

    fn send(&self, action: Self::SendableAction);
}

/// Type-erased sender handed to effect jobs.
pub struct AnyActionSender<Action: Send + 'static> {
    value: Box<dyn ActionSender<SendableAction = Action> + Sync>,
}

impl<Action: Send> AnyActionSender<Action> {
    pub fn new(value: Box<dyn ActionSender<SendableAction = Action> + Sync>) -> Self {
        Self { value }
    }
}

impl<Action: Send> ActionSender for AnyActionSender<Action> {
    type SendableAction = Action;

    fn send(&self, action: Action) {
        self.value.send(action)
    }
}

/// Sender backed by an unbounded channel. Used where effect output is
/// collected rather than reduced, e.g. by the test store. Every action is
/// tagged with the effect's origin.
pub(crate) struct ChannelSender<Action: Send + 'static> {
    tx: UnboundedSender<StoreEvent<Action>>,
    origin: Option<Origin>,
}

impl<Action: Send> ChannelSender<Action> {
    pub(crate) fn new(tx: UnboundedSender<StoreEvent<Action>>, origin: Option<Origin>) -> Self {
        Self { tx, origin }
    }
}

impl<Action: Send> ActionSender for ChannelSender<Action> {
    type SendableAction = Action;

    fn send(&self, action: Action) {
        // Receiver gone means the owner stopped listening; dropping is fine.
        let _ = self.tx.send(StoreEvent::EffectOutput {
            action,
            origin: self.origin,
        });
    }
}
