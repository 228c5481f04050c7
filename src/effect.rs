use crate::action_sender::{ActionSender, AnyActionSender};
use futures::{Stream, StreamExt};
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

pub type AsyncActionJob<Action> =
    Box<dyn FnOnce(AnyActionSender<Action>) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Identifies an in-flight effect so a later one can replace or cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CancelId(&'static str);

impl CancelId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl From<&'static str> for CancelId {
    fn from(name: &'static str) -> Self {
        Self(name)
    }
}

/// Work returned by a reducer. Nothing runs until the store schedules it.
pub struct Effect<Action: Send + 'static> {
    pub value: EffectValue<Action>,
}

pub enum EffectValue<Action: Send + 'static> {
    None,
    Send(Action),
    Async(AsyncActionJob<Action>),
    /// Starting this cancels whatever is still running under `id`.
    Cancellable {
        id: CancelId,
        effect: Box<Effect<Action>>,
    },
    Cancel(CancelId),
    Merge(Vec<Effect<Action>>),
}

impl<Action> Effect<Action>
where
    Action: Send + 'static,
{
    pub fn run<T, Fut>(job: T) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
        T: FnOnce(AnyActionSender<Action>) -> Fut + Send + 'static,
    {
        let boxed_job: AsyncActionJob<Action> = Box::new(
            move |sender: AnyActionSender<Action>| -> Pin<Box<dyn Future<Output = ()> + Send>> {
                Box::pin(job(sender))
            },
        );
        Self {
            value: EffectValue::Async(boxed_job),
        }
    }

    /// Emits at most one action once `fut` resolves.
    pub fn future<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Option<Action>> + Send + 'static,
    {
        Self::run(|sender| async move {
            if let Some(action) = fut.await {
                sender.send(action);
            }
        })
    }

    /// Forwards every item of `stream`, completing when the stream ends.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Action> + Send + 'static,
    {
        Self::run(|sender| async move {
            let mut stream = std::pin::pin!(stream);
            while let Some(action) = stream.next().await {
                sender.send(action);
            }
        })
    }

    pub fn none() -> Self {
        Self {
            value: EffectValue::None,
        }
    }

    pub fn send(action: Action) -> Self {
        Self {
            value: EffectValue::Send(action),
        }
    }

    pub fn cancel(id: impl Into<CancelId>) -> Self {
        Self {
            value: EffectValue::Cancel(id.into()),
        }
    }

    pub fn merge(effects: impl IntoIterator<Item = Effect<Action>>) -> Self {
        Self {
            value: EffectValue::Merge(effects.into_iter().collect()),
        }
    }

    /// Registers this effect under `id`; an earlier effect with the same id
    /// is cancelled and its undelivered output discarded.
    pub fn cancellable(self, id: impl Into<CancelId>) -> Self {
        Self {
            value: EffectValue::Cancellable {
                id: id.into(),
                effect: Box::new(self),
            },
        }
    }

    pub fn is_none(&self) -> bool {
        match &self.value {
            EffectValue::None => true,
            EffectValue::Merge(effects) => effects.iter().all(Effect::is_none),
            _ => false,
        }
    }
}

impl<Action: Send + 'static> Debug for Effect<Action>
where
    Action: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

impl<Action: Send> Debug for EffectValue<Action>
where
    Action: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Send(action) => f.debug_tuple("Send").field(action).finish(),
            Self::Async(_) => f.write_str("Async"),
            Self::Cancellable { id, effect } => f
                .debug_struct("Cancellable")
                .field("id", id)
                .field("effect", effect)
                .finish(),
            Self::Cancel(id) => f.debug_tuple("Cancel").field(id).finish(),
            Self::Merge(effects) => f.debug_tuple("Merge").field(effects).finish(),
        }
    }
}
