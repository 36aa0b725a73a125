use std::collections::HashMap;

use neo4j_reactive_core::{CursorPublisher, ReactiveClient};
use neo4rs::{BoltType as Value, Graph};
use tracing::info;

use crate::config::ClientConfig;
use crate::driver::{GraphDriver, RowCursor};
use crate::error::ClientError;
use crate::query::Statement;

/// Publisher of the rows of one query.
pub type RecordPublisher = CursorPublisher<RowCursor>;

/// Publisher returned by [`Neo4jClient::close`].
pub type ClosePublisher = neo4j_reactive_core::ClosePublisher<ClientError>;

/// The client side representation of a Neo4j instance or cluster.
///
/// Every [`execute`](Self::execute) returns an independent, cold
/// [`RecordPublisher`]: the query is only sent once a subscriber requests
/// rows, and rows are pulled from the server no faster than requested.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Clone, Debug)]
pub struct Neo4jClient {
    inner: ReactiveClient<GraphDriver>,
}

impl Neo4jClient {
    /// Connect with user/password authentication.
    pub async fn new(
        uri: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::connect(ClientConfig::new(uri, user, password)).await
    }

    /// Connect using `config`.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let graph = Graph::connect(config.to_neo4rs()?).await?;
        info!(uri = config.uri(), db = config.db(), "connected");
        Ok(Self::from_graph(graph))
    }

    /// Wrap an existing connection pool.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn from_graph(graph: Graph) -> Self {
        Self {
            inner: ReactiveClient::new(GraphDriver::new(graph)),
        }
    }

    /// Publish the rows of `query`.
    pub fn execute(&self, query: impl Into<String>) -> RecordPublisher {
        self.inner.execute(query)
    }

    /// Publish the rows of `query` with named parameters. `None` is the same
    /// as an empty map.
    pub fn execute_with(
        &self,
        query: impl Into<String>,
        parameters: Option<HashMap<String, Value>>,
    ) -> RecordPublisher {
        self.inner.execute_with(query, parameters)
    }

    /// Start building a parameterized statement.
    pub fn query(&self, text: impl Into<String>) -> Statement<'_> {
        Statement::new(self, text)
    }

    /// Close the client and its connection pool.
    ///
    /// Nothing happens until the returned publisher is subscribed and
    /// requested; it then emits a single [`VoidSignal`](crate::VoidSignal) and
    /// completes. Closing twice succeeds.
    pub fn close(&self) -> ClosePublisher {
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.driver().is_closed()
    }
}
