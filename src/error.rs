//! Error type surfaced through record streams.

use thiserror::Error;

/// Unified error type for all client operations.
///
/// Driver failures are forwarded verbatim inside [`Neo4j`](ClientError::Neo4j);
/// the client neither classifies nor retries them.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A `neo4rs::Error` from the underlying driver: malformed queries,
    /// engine-side failures, broken connections.
    #[error("neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),

    /// A query was submitted after the client was closed.
    #[error("client is closed")]
    Closed,

    /// A single-row fetch found an empty result.
    #[error("query returned no rows")]
    NoRows,

    /// A configuration value could not be used.
    #[error("invalid configuration value for {key}: {message}")]
    Config { key: String, message: String },
}

impl ClientError {
    /// Create a [`Config`](ClientError::Config) error.
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        ClientError::Config {
            key: key.to_owned(),
            message: message.into(),
        }
    }
}
