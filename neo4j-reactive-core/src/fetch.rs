//! Drives a [`Cursor`] under subscriber demand.
//!
//! A stream is in one of three states, moved only by compare-and-set:
//!
//! - `IDLE`: nobody is fetching. The cursor and the subscriber are parked.
//! - `IN_FLIGHT`: exactly one task owns the cursor and the subscriber.
//! - `TERMINATED`: a terminal signal was sent or the stream was cancelled.
//!
//! Whoever moves the state from `IDLE` to `IN_FLIGHT` takes the parked
//! cursor and drains it while demand lasts. Losing that race is a no-op: the
//! current owner re-checks demand before it parks again.
//!
//! Once demand runs out the owner fetches one more record and holds it, so
//! end-of-data and failures are signalled without waiting for demand that a
//! subscriber has no reason to send. A held record is the first one
//! delivered on the next request.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use crate::cursor::Cursor;
use crate::demand::Demand;
use crate::publisher::{Control, Publisher, Subscriber, Subscription};

const IDLE: u8 = 0;
const IN_FLIGHT: u8 = 1;
const TERMINATED: u8 = 2;

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

type Sink<C> = Box<dyn Subscriber<<C as Cursor>::Item, <C as Cursor>::Error>>;

enum Source<C: Cursor> {
    Opening(BoxFuture<'static, Result<C, C::Error>>),
    Open(C),
}

/// Everything owned by whichever task currently holds the `IN_FLIGHT` state.
struct Flight<C: Cursor> {
    source: Source<C>,
    sink: Sink<C>,
    // At most one record fetched past the subscriber's demand.
    lookahead: Option<C::Item>,
}

/// Publisher of the records behind a single cursor.
///
/// Nothing happens until [`subscribe`](Publisher::subscribe) is called and
/// the subscriber requests demand; the cursor is then opened on the runtime
/// and fetched one record at a time.
pub struct CursorPublisher<C: Cursor> {
    source: Source<C>,
    runtime: Handle,
}

impl<C: Cursor> CursorPublisher<C> {
    /// Publish the cursor `open` resolves to. An open failure is delivered as
    /// the stream's error signal.
    pub fn new<F>(open: F, runtime: Handle) -> Self
    where
        F: std::future::Future<Output = Result<C, C::Error>> + Send + 'static,
    {
        Self {
            source: Source::Opening(open.boxed()),
            runtime,
        }
    }

    /// Publish an already open cursor.
    pub fn from_cursor(cursor: C, runtime: Handle) -> Self {
        Self {
            source: Source::Open(cursor),
            runtime,
        }
    }
}

impl<C: Cursor> fmt::Debug for CursorPublisher<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opened = matches!(self.source, Source::Open(_));
        f.debug_struct("CursorPublisher").field("opened", &opened).finish_non_exhaustive()
    }
}

impl<C: Cursor> Publisher for CursorPublisher<C> {
    type Item = C::Item;
    type Error = C::Error;

    fn subscribe<S>(self, subscriber: S)
    where
        S: Subscriber<C::Item, C::Error>,
    {
        // Start out IN_FLIGHT so requests made from inside on_subscribe only
        // record demand; the flight is released below once it is complete.
        let fetch = Arc::new(FetchLoop::<C> {
            id: NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed),
            demand: Demand::new(),
            active: AtomicBool::new(true),
            state: AtomicU8::new(IN_FLIGHT),
            parked: Mutex::new(None),
            runtime: self.runtime,
        });
        debug!(stream = fetch.id, "subscribed");

        let mut sink: Sink<C> = Box::new(subscriber);
        sink.on_subscribe(Subscription::new(Arc::clone(&fetch) as Arc<dyn Control>));

        let flight = Flight {
            source: self.source,
            sink,
            lookahead: None,
        };
        if let Some(flight) = fetch.release(flight) {
            fetch.spawn(flight);
        }
    }
}

struct FetchLoop<C: Cursor> {
    id: u64,
    demand: Demand,
    active: AtomicBool,
    state: AtomicU8,
    // Only touched by the task that owns IN_FLIGHT, or by the task that moves
    // IDLE to TERMINATED, so the lock is never contended.
    parked: Mutex<Option<Flight<C>>>,
    runtime: Handle,
}

impl<C: Cursor> FetchLoop<C> {
    fn park(&self, flight: Flight<C>) {
        *self.parked.lock().unwrap_or_else(PoisonError::into_inner) = Some(flight);
    }

    fn unpark(&self) -> Option<Flight<C>> {
        self.parked.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Move IDLE to IN_FLIGHT and take the parked flight.
    fn try_acquire(&self) -> Option<Flight<C>> {
        if !self.is_active() || !self.demand.has_demand() {
            return None;
        }
        self.state
            .compare_exchange(IDLE, IN_FLIGHT, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        self.unpark()
    }

    /// Park `flight` and drop to IDLE, then re-check for demand or a cancel
    /// that arrived while the flight was held. Returns the flight again if
    /// draining must continue.
    fn release(&self, flight: Flight<C>) -> Option<Flight<C>> {
        self.park(flight);
        self.state.store(IDLE, Ordering::SeqCst);

        if !self.is_active() {
            self.dispose();
            return None;
        }
        self.try_acquire()
    }

    /// Move IDLE to TERMINATED and drop the parked cursor and subscriber.
    fn dispose(&self) {
        if self
            .state
            .compare_exchange(IDLE, TERMINATED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            drop(self.unpark());
            debug!(stream = self.id, "released cursor after cancel");
        }
    }

    fn spawn(self: &Arc<Self>, flight: Flight<C>) {
        let this = Arc::clone(self);
        self.runtime.spawn(async move { this.drive(flight).await });
    }

    async fn drive(self: Arc<Self>, mut flight: Flight<C>) {
        loop {
            if !self.is_active() {
                self.state.store(TERMINATED, Ordering::SeqCst);
                debug!(stream = self.id, "cancelled, discarding cursor");
                return;
            }
            if flight.lookahead.is_some() {
                if !self.demand.take_one() {
                    match self.release(flight) {
                        Some(next) => {
                            flight = next;
                            continue;
                        }
                        None => return,
                    }
                }
                if let Some(item) = flight.lookahead.take() {
                    trace!(stream = self.id, "forwarding held record");
                    flight.sink.on_next(item);
                }
                continue;
            }

            let cursor = match &mut flight.source {
                Source::Open(cursor) => cursor,
                Source::Opening(open) => match open.await {
                    Ok(cursor) => {
                        debug!(stream = self.id, "cursor opened");
                        flight.source = Source::Open(cursor);
                        continue;
                    }
                    Err(error) => {
                        self.fail(flight.sink, error);
                        return;
                    }
                },
            };

            match cursor.fetch_next().await {
                Ok(Some(item)) => {
                    if !self.is_active() {
                        trace!(stream = self.id, "dropping record after cancel");
                    } else if self.demand.take_one() {
                        trace!(stream = self.id, "forwarding record");
                        flight.sink.on_next(item);
                    } else {
                        trace!(stream = self.id, "holding record until demand");
                        flight.lookahead = Some(item);
                    }
                }
                Ok(None) => {
                    self.state.store(TERMINATED, Ordering::SeqCst);
                    if self.active.swap(false, Ordering::SeqCst) {
                        debug!(stream = self.id, "cursor exhausted");
                        flight.sink.on_complete();
                    }
                    return;
                }
                Err(error) => {
                    self.fail(flight.sink, error);
                    return;
                }
            }
        }
    }

    fn fail(&self, mut sink: Sink<C>, error: C::Error) {
        self.state.store(TERMINATED, Ordering::SeqCst);
        if self.active.swap(false, Ordering::SeqCst) {
            debug!(stream = self.id, "cursor failed");
            sink.on_error(error);
        }
    }
}

impl<C: Cursor> Control for FetchLoop<C> {
    fn request(self: Arc<Self>, n: u64) {
        if n == 0 {
            warn!(stream = self.id, "ignoring request for zero items");
            return;
        }
        if !self.is_active() {
            return;
        }
        self.demand.add(n);
        if let Some(flight) = self.try_acquire() {
            self.spawn(flight);
        }
    }

    fn cancel(self: Arc<Self>) {
        if self.active.swap(false, Ordering::SeqCst) {
            debug!(stream = self.id, "cancelled");
            self.demand.clear();
            self.dispose();
        }
    }
}
