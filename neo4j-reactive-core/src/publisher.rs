//! The push-stream contract between a result publisher and its consumer.
//!
//! A [`Publisher`] is subscribed exactly once. The [`Subscriber`] first
//! receives a [`Subscription`] through [`on_subscribe`](Subscriber::on_subscribe),
//! then zero or more items (never more than it requested), then at most one
//! terminal signal. Signals are never delivered concurrently.

use std::fmt;
use std::sync::Arc;

use crate::demand::UNBOUNDED;
use crate::stream::{PublisherStream, DEFAULT_PREFETCH};

/// A cold source of items that starts producing once subscribed.
pub trait Publisher {
    type Item: Send + 'static;
    type Error: Send + 'static;

    /// Attach `subscriber`. Nothing is fetched until it requests demand.
    fn subscribe<S>(self, subscriber: S)
    where
        S: Subscriber<Self::Item, Self::Error>;

    /// Consume the publisher as a pull-based [`futures::Stream`].
    ///
    /// Keeps [`DEFAULT_PREFETCH`] items of demand outstanding.
    fn into_stream(self) -> PublisherStream<Self::Item, Self::Error>
    where
        Self: Sized,
    {
        self.into_stream_with_prefetch(DEFAULT_PREFETCH)
    }

    /// Like [`into_stream`](Self::into_stream) with an explicit demand window.
    /// A window of zero is treated as one.
    fn into_stream_with_prefetch(self, prefetch: u64) -> PublisherStream<Self::Item, Self::Error>
    where
        Self: Sized,
    {
        PublisherStream::subscribe_to(self, prefetch)
    }
}

/// Receiver side of a stream.
///
/// All callbacks for one subscription are serialized. `on_subscribe` is
/// called first and exactly once; after `on_error` or `on_complete` nothing
/// else is called.
pub trait Subscriber<T, E>: Send + 'static {
    fn on_subscribe(&mut self, subscription: Subscription);
    fn on_next(&mut self, item: T);
    fn on_error(&mut self, error: E);
    fn on_complete(&mut self);
}

/// Control surface a publisher hands to its subscriber.
pub(crate) trait Control: Send + Sync + 'static {
    fn request(self: Arc<Self>, n: u64);
    fn cancel(self: Arc<Self>);
}

/// Handle used by a subscriber to signal demand or cancel.
///
/// Cloning yields another handle to the same stream. Calls are safe from any
/// thread, including from inside the subscriber's own callbacks, and become
/// no-ops once the stream has terminated.
#[derive(Clone)]
pub struct Subscription {
    control: Arc<dyn Control>,
}

impl Subscription {
    /// Request value for infinite demand.
    pub const UNBOUNDED: u64 = UNBOUNDED;

    pub(crate) fn new(control: Arc<dyn Control>) -> Self {
        Self { control }
    }

    /// Authorize `n` more items. `n == 0` is ignored; [`Subscription::UNBOUNDED`]
    /// switches to infinite demand.
    pub fn request(&self, n: u64) {
        Arc::clone(&self.control).request(n);
    }

    pub fn request_unbounded(&self) {
        self.request(UNBOUNDED);
    }

    /// Stop the stream. Idempotent. No signal follows a cancel, not even a
    /// terminal one.
    pub fn cancel(&self) {
        Arc::clone(&self.control).cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// A single signal observed by a subscriber, in owned form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal<T, E> {
    Next(T),
    Error(E),
    Complete,
}

impl<T, E> Signal<T, E> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Signal::Next(_))
    }
}
