//! Backpressure-aware publishing of asynchronous database cursors.
//!
//! This crate is not tied to a particular database. The [`neo4j-reactive`]
//! facade crate binds it to `neo4rs`; other drivers plug in by implementing
//! [`Driver`] and [`Cursor`].
//!
//! [`neo4j-reactive`]: https://docs.rs/neo4j-reactive

pub mod client;
pub mod cursor;
pub mod demand;
pub mod fetch;
pub mod publisher;
pub mod signal;
pub mod stream;

pub use client::{ClosePublisher, ReactiveClient};
pub use cursor::{Cursor, Deferred, Driver, DriverError, QueryRequest};
pub use demand::{Demand, UNBOUNDED};
pub use fetch::CursorPublisher;
pub use publisher::{Publisher, Signal, Subscriber, Subscription};
pub use signal::VoidSignal;
pub use stream::{PublisherStream, DEFAULT_PREFETCH};
