#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::future::BoxFuture;
use futures::StreamExt;
use neo4j_reactive_core::{Cursor, Signal, Subscriber, Subscription};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestError(pub String);

pub type Step = Result<Option<&'static str>, TestError>;

/// What a test can observe about a cursor from the outside.
#[derive(Default)]
pub struct CursorProbe {
    pub fetches: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub dropped: AtomicBool,
    started: Notify,
    gate: Option<Arc<Notify>>,
}

impl CursorProbe {
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Resolve once a fetch has started.
    pub async fn fetch_started(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.started.notified())
            .await
            .expect("no fetch started");
    }
}

/// Cursor replaying a fixed script, then end-of-data forever.
pub struct ScriptedCursor {
    steps: VecDeque<Step>,
    probe: Arc<CursorProbe>,
}

impl ScriptedCursor {
    pub fn new(steps: Vec<Step>) -> (Self, Arc<CursorProbe>) {
        Self::with_probe(steps, CursorProbe::default())
    }

    pub fn items(items: &[&'static str]) -> (Self, Arc<CursorProbe>) {
        Self::new(items.iter().map(|i| Ok(Some(*i))).collect())
    }

    /// Every fetch waits for `gate` to be notified before completing.
    pub fn gated(steps: Vec<Step>, gate: Arc<Notify>) -> (Self, Arc<CursorProbe>) {
        Self::with_probe(steps, CursorProbe { gate: Some(gate), ..CursorProbe::default() })
    }

    fn with_probe(steps: Vec<Step>, probe: CursorProbe) -> (Self, Arc<CursorProbe>) {
        let probe = Arc::new(probe);
        (Self { steps: steps.into(), probe: Arc::clone(&probe) }, probe)
    }
}

impl Cursor for ScriptedCursor {
    type Item = &'static str;
    type Error = TestError;

    fn fetch_next(&mut self) -> BoxFuture<'_, Step> {
        Box::pin(async move {
            let probe = Arc::clone(&self.probe);
            probe.fetches.fetch_add(1, Ordering::SeqCst);
            let now = probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            probe.max_in_flight.fetch_max(now, Ordering::SeqCst);
            probe.started.notify_one();

            match &probe.gate {
                Some(gate) => gate.notified().await,
                None => tokio::task::yield_now().await,
            }

            probe.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.steps.pop_front().unwrap_or(Ok(None))
        })
    }
}

impl Drop for ScriptedCursor {
    fn drop(&mut self) {
        self.probe.dropped.store(true, Ordering::SeqCst);
    }
}

/// Subscriber that reports every signal to an [`Observed`] handle.
pub struct Recorder<T> {
    tx: UnboundedSender<Signal<T, TestError>>,
    subscription: Arc<Mutex<Option<Subscription>>>,
    initial: u64,
    cancel_after: Option<usize>,
    seen: usize,
}

pub struct Observed<T> {
    rx: UnboundedReceiver<Signal<T, TestError>>,
    subscription: Arc<Mutex<Option<Subscription>>>,
}

/// A recorder requesting `initial` items on subscribe (nothing if zero).
pub fn recorder<T>(initial: u64) -> (Recorder<T>, Observed<T>) {
    let (tx, rx) = mpsc::unbounded();
    let subscription = Arc::new(Mutex::new(None));
    (
        Recorder {
            tx,
            subscription: Arc::clone(&subscription),
            initial,
            cancel_after: None,
            seen: 0,
        },
        Observed { rx, subscription },
    )
}

impl<T> Recorder<T> {
    /// Cancel from inside `on_next` once `n` items were received.
    pub fn cancel_after(mut self, n: usize) -> Self {
        self.cancel_after = Some(n);
        self
    }
}

impl<T: Send + 'static> Subscriber<T, TestError> for Recorder<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        if self.initial > 0 {
            subscription.request(self.initial);
        }
        *self.subscription.lock().unwrap() = Some(subscription);
    }

    fn on_next(&mut self, item: T) {
        self.seen += 1;
        let _ = self.tx.unbounded_send(Signal::Next(item));
        if self.cancel_after == Some(self.seen) {
            if let Some(subscription) = self.subscription.lock().unwrap().as_ref() {
                subscription.cancel();
            }
        }
    }

    fn on_error(&mut self, error: TestError) {
        let _ = self.tx.unbounded_send(Signal::Error(error));
    }

    fn on_complete(&mut self) {
        let _ = self.tx.unbounded_send(Signal::Complete);
    }
}

impl<T: std::fmt::Debug> Observed<T> {
    pub fn subscription(&self) -> Subscription {
        self.subscription.lock().unwrap().clone().expect("not subscribed")
    }

    pub async fn next_signal(&mut self) -> Signal<T, TestError> {
        tokio::time::timeout(Duration::from_secs(5), self.rx.next())
            .await
            .expect("timed out waiting for a signal")
            .expect("publisher released the subscriber without a terminal signal")
    }

    pub async fn take(&mut self, n: usize) -> Vec<Signal<T, TestError>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.next_signal().await);
        }
        out
    }

    /// Assert that nothing else arrives for a while.
    pub async fn expect_quiet(&mut self) {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if let Ok(signal) = self.rx.try_recv() {
            panic!("unexpected signal: {signal:?}");
        }
    }

    /// Collect everything until the publisher drops the subscriber.
    pub async fn drain(&mut self) -> Vec<Signal<T, TestError>> {
        let mut out = Vec::new();
        loop {
            let signal = tokio::time::timeout(Duration::from_secs(5), self.rx.next())
                .await
                .expect("subscriber still held");
            match signal {
                Some(signal) => out.push(signal),
                None => return out,
            }
        }
    }

    /// Resolve once the publisher has dropped the subscriber.
    pub async fn released(&mut self) {
        let rest = tokio::time::timeout(Duration::from_secs(5), self.rx.next())
            .await
            .expect("subscriber still held");
        assert!(rest.is_none(), "unexpected signal: {rest:?}");
    }
}

pub fn next(item: &'static str) -> Signal<&'static str, TestError> {
    Signal::Next(item)
}
