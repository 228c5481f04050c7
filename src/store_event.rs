use crate::effect::CancelId;

/// Entry in the store mailbox.
pub(crate) enum StoreEvent<Action: Send + 'static> {
    /// Sent by a client or produced synchronously by an `Effect::send`.
    Action(Action),
    /// Emitted by a running effect. `origin` is set when the effect was
    /// registered as cancellable, so superseded output can be dropped.
    EffectOutput {
        action: Action,
        origin: Option<Origin>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Origin {
    pub id: CancelId,
    pub generation: u64,
}

impl<Action: Send + 'static> StoreEvent<Action> {
    pub(crate) fn into_parts(self) -> (Action, Option<Origin>) {
        match self {
            Self::Action(action) => (action, None),
            Self::EffectOutput { action, origin } => (action, origin),
        }
    }
}
