use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Fan-out to every live subscriber. Each subscriber has its own unbounded
/// queue, so a slow reader never loses or coalesces values.
pub(crate) struct Subscribers<T> {
    // `None` once closed.
    senders: Mutex<Option<Vec<UnboundedSender<T>>>>,
}

impl<T: Clone> Subscribers<T> {
    pub(crate) fn new() -> Self {
        Self {
            senders: Mutex::new(Some(Vec::new())),
        }
    }

    pub(crate) fn subscribe(&self) -> UnboundedReceiver<T> {
        let (tx, rx) = unbounded_channel();
        if let Some(senders) = self.senders.lock().as_mut() {
            senders.push(tx);
        }
        rx
    }

    pub(crate) fn publish(&self, value: &T) {
        if let Some(senders) = self.senders.lock().as_mut() {
            senders.retain(|tx| tx.send(value.clone()).is_ok());
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.lock().as_ref().map_or(0, Vec::len)
    }

    /// Drops every sender, ending all subscriber streams.
    pub(crate) fn close(&self) {
        self.senders.lock().take();
    }
}

type Projection<State, T> = Box<dyn Fn(&State) -> T + Send + Sync>;

/// Stream of a projected slice of state, suppressing consecutive duplicates.
///
/// The comparison baseline is the projection of the state at the moment of
/// subscription, so only real changes are yielded. Ends when the store
/// shuts down.
pub struct StateSelection<State, T> {
    receiver: UnboundedReceiver<Arc<State>>,
    projection: Projection<State, T>,
    last: T,
}

impl<State, T> StateSelection<State, T> {
    pub(crate) fn new(
        receiver: UnboundedReceiver<Arc<State>>,
        projection: Projection<State, T>,
        baseline: T,
    ) -> Self {
        Self {
            receiver,
            projection,
            last: baseline,
        }
    }
}

impl<State, T> Unpin for StateSelection<State, T> {}

impl<State, T> Stream for StateSelection<State, T>
where
    T: PartialEq + Clone,
{
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        loop {
            match this.receiver.poll_recv(cx) {
                Poll::Ready(Some(state)) => {
                    let value = (this.projection)(&state);
                    if value != this.last {
                        this.last = value.clone();
                        return Poll::Ready(Some(value));
                    }
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

type Extractor<Action, T> = Box<dyn Fn(&Action) -> Option<T> + Send + Sync>;

/// Stream of the processed actions that `extract` matches.
pub struct ActionSelection<Action, T> {
    receiver: UnboundedReceiver<Action>,
    extract: Extractor<Action, T>,
}

impl<Action, T> ActionSelection<Action, T> {
    pub(crate) fn new(receiver: UnboundedReceiver<Action>, extract: Extractor<Action, T>) -> Self {
        Self { receiver, extract }
    }
}

impl<Action, T> Unpin for ActionSelection<Action, T> {}

impl<Action, T> Stream for ActionSelection<Action, T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        loop {
            match this.receiver.poll_recv(cx) {
                Poll::Ready(Some(action)) => {
                    if let Some(value) = (this.extract)(&action) {
                        return Poll::Ready(Some(value));
                    }
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
