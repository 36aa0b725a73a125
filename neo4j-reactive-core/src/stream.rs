//! Pulling from a [`Publisher`] through [`futures::Stream`].

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::stream::{FusedStream, Stream, StreamExt};

use crate::publisher::{Publisher, Signal, Subscriber, Subscription};

/// Demand window used by [`Publisher::into_stream`].
pub const DEFAULT_PREFETCH: u64 = 32;

enum Event<T, E> {
    Subscribed(Subscription),
    Signal(Signal<T, E>),
}

/// Forwards every callback into a channel read by [`PublisherStream`].
struct ChannelSubscriber<T, E> {
    tx: UnboundedSender<Event<T, E>>,
    prefetch: u64,
}

impl<T, E> Subscriber<T, E> for ChannelSubscriber<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn on_subscribe(&mut self, subscription: Subscription) {
        subscription.request(self.prefetch);
        // A closed channel means the stream was dropped before it got here.
        if let Err(rejected) = self.tx.unbounded_send(Event::Subscribed(subscription)) {
            if let Event::Subscribed(subscription) = rejected.into_inner() {
                subscription.cancel();
            }
        }
    }

    fn on_next(&mut self, item: T) {
        let _ = self.tx.unbounded_send(Event::Signal(Signal::Next(item)));
    }

    fn on_error(&mut self, error: E) {
        let _ = self.tx.unbounded_send(Event::Signal(Signal::Error(error)));
    }

    fn on_complete(&mut self) {
        let _ = self.tx.unbounded_send(Event::Signal(Signal::Complete));
    }
}

/// A typed stream of results pulled from a [`Publisher`].
///
/// Created by [`Publisher::into_stream`]. Keeps up to `prefetch` items of
/// demand outstanding and tops it up once three quarters of the window have
/// been consumed, so the channel between publisher and stream never holds
/// more than `prefetch` items. An error ends the stream after it is yielded.
/// Dropping the stream cancels the subscription.
///
/// # Example
///
/// ```rust,no_run
/// # use neo4j_reactive_core::{Cursor, CursorPublisher, Publisher};
/// # async fn example<C: Cursor>(publisher: CursorPublisher<C>) -> Result<(), C::Error> {
/// let mut stream = publisher.into_stream();
/// while let Some(item) = stream.next().await {
///     let item = item?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct PublisherStream<T, E> {
    rx: UnboundedReceiver<Event<T, E>>,
    subscription: Option<Subscription>,
    limit: u64,
    consumed: u64,
    done: bool,
}

impl<T, E> PublisherStream<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn subscribe_to<P>(publisher: P, prefetch: u64) -> Self
    where
        P: Publisher<Item = T, Error = E>,
    {
        let prefetch = prefetch.max(1);
        let (tx, rx) = mpsc::unbounded();
        publisher.subscribe(ChannelSubscriber { tx, prefetch });
        Self {
            rx,
            subscription: None,
            limit: (prefetch - prefetch / 4).max(1),
            consumed: 0,
            done: false,
        }
    }

    /// Pull the next item. Returns `None` once the stream has completed or
    /// after an error was returned.
    pub async fn next(&mut self) -> Option<Result<T, E>> {
        StreamExt::next(self).await
    }

    fn replenish(&mut self) {
        self.consumed += 1;
        if self.consumed >= self.limit {
            if let Some(subscription) = &self.subscription {
                subscription.request(self.consumed);
            }
            self.consumed = 0;
        }
    }
}

impl<T, E> Stream for PublisherStream<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        loop {
            let event = match this.rx.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(event) => event,
            };
            match event {
                Some(Event::Subscribed(subscription)) => this.subscription = Some(subscription),
                Some(Event::Signal(Signal::Next(item))) => {
                    this.replenish();
                    return Poll::Ready(Some(Ok(item)));
                }
                Some(Event::Signal(Signal::Error(error))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
                Some(Event::Signal(Signal::Complete)) | None => {
                    this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl<T, E> FusedStream for PublisherStream<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn is_terminated(&self) -> bool {
        self.done
    }
}

impl<T, E> Drop for PublisherStream<T, E> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        self.rx.close();
        // Never polled: the subscription may still be queued.
        while self.subscription.is_none() {
            match self.rx.try_recv() {
                Ok(Event::Subscribed(subscription)) => self.subscription = Some(subscription),
                Ok(Event::Signal(_)) => {}
                Err(_) => break,
            }
        }
        if let Some(subscription) = &self.subscription {
            subscription.cancel();
        }
    }
}
