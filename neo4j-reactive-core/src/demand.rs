//! Outstanding-request accounting shared between consumers and the fetch loop.

use std::sync::atomic::{AtomicU64, Ordering};

/// Sentinel for infinite demand. Once reached, demand stays unbounded until
/// it is [cleared](Demand::clear).
pub const UNBOUNDED: u64 = u64::MAX;

/// Number of items a subscriber has authorized but not yet received.
///
/// Every mutation is a compare-and-swap loop, so consumer threads calling
/// [`add`](Demand::add) never block the completion thread calling
/// [`take_one`](Demand::take_one) and vice versa.
///
/// ```rust
/// # use neo4j_reactive_core::Demand;
/// let demand = Demand::new();
/// demand.add(2);
/// assert!(demand.take_one());
/// assert!(demand.take_one());
/// assert!(!demand.take_one());
/// ```
#[derive(Debug, Default)]
pub struct Demand {
    remaining: AtomicU64,
}

impl Demand {
    pub const fn new() -> Self {
        Self { remaining: AtomicU64::new(0) }
    }

    /// Add `n` units, saturating at [`UNBOUNDED`].
    ///
    /// Returns `true` if this call moved demand from zero to positive, which
    /// makes the caller responsible for waking an idle fetch loop.
    pub fn add(&self, n: u64) -> bool {
        if n == 0 {
            return false;
        }
        let mut current = self.remaining.load(Ordering::SeqCst);
        loop {
            if current == UNBOUNDED {
                return false;
            }
            let next = current.saturating_add(n);
            match self
                .remaining
                .compare_exchange_weak(current, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return current == 0,
                Err(actual) => current = actual,
            }
        }
    }

    /// Consume one unit before forwarding an item.
    ///
    /// Unbounded demand is never decremented. Returns `false` when nothing is
    /// outstanding; the caller must then hold the item back.
    pub fn take_one(&self) -> bool {
        let mut current = self.remaining.load(Ordering::SeqCst);
        loop {
            match current {
                0 => return false,
                UNBOUNDED => return true,
                n => match self
                    .remaining
                    .compare_exchange_weak(current, n - 1, Ordering::SeqCst, Ordering::SeqCst)
                {
                    Ok(_) => return true,
                    Err(actual) => current = actual,
                },
            }
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.remaining.load(Ordering::SeqCst) == UNBOUNDED
    }

    pub fn has_demand(&self) -> bool {
        self.remaining.load(Ordering::SeqCst) > 0
    }

    /// Finite outstanding demand, or `None` when unbounded.
    pub fn remaining(&self) -> Option<u64> {
        match self.remaining.load(Ordering::SeqCst) {
            UNBOUNDED => None,
            n => Some(n),
        }
    }

    /// Drop all outstanding demand, including the unbounded state.
    pub fn clear(&self) {
        self.remaining.store(0, Ordering::SeqCst);
    }
}
