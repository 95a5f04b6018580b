use std::pin::Pin;
use std::task::{Context, Poll};

use futures::StreamExt;
use futures::channel::mpsc::{UnboundedReceiver, unbounded};

use super::{Stream, Subscription};

/// A [`Stream`] observed through `futures::Stream`. Values are buffered until
/// polled; dropping the adapter detaches it.
pub struct AsyncStream<T> {
    receiver: UnboundedReceiver<T>,
    _subscription: Subscription,
}

impl<T: Clone + 'static> Stream<T> {
    pub fn into_async(&self) -> AsyncStream<T> {
        let (sender, receiver) = unbounded();
        let subscription = self.subscribe(move |value| {
            // The receiver lives as long as the subscription, so sending only
            // fails while the adapter is being dropped.
            let _ = sender.unbounded_send(value.clone());
        });
        AsyncStream {
            receiver,
            _subscription: subscription,
        }
    }
}

impl<T> futures::Stream for AsyncStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}
