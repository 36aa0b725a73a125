//! Convenience re-exports for common usage.
//!
//! ```rust
//! use neo4j_reactive::prelude::*;
//! ```
//!
//! Brings in the client, its error and configuration types, the
//! [`Publisher`]/[`Subscriber`] traits needed to subscribe to results, and
//! [`RecordStream`].

pub use crate::client::{ClosePublisher, Neo4jClient, RecordPublisher};
pub use crate::config::ClientConfig;
pub use crate::error::ClientError;
pub use crate::query::Statement;
pub use crate::stream::RecordStream;
pub use neo4j_reactive_core::{Publisher, Signal, Subscriber, Subscription, VoidSignal};
