use std::collections::HashMap;

use futures::TryStreamExt;
use neo4j_reactive_core::QueryRequest;
use neo4rs::{BoltType as Value, Row};

use crate::client::{Neo4jClient, RecordPublisher};
use crate::error::ClientError;
use crate::stream::RecordStream;

/// A parameterized query bound to a [`Neo4jClient`].
///
/// Provides a builder-style `.param()` API and consumes itself into a
/// publisher, a stream, or collected rows.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn example(client: &neo4j_reactive::Neo4jClient) -> Result<(), neo4j_reactive::ClientError> {
/// let rows = client
///     .query("UNWIND range(1, $n) AS n RETURN n")
///     .param("n", 10_i64)
///     .fetch_all()
///     .await?;
/// assert_eq!(rows.len(), 10);
/// # Ok(())
/// # }
/// ```
pub struct Statement<'c> {
    client: &'c Neo4jClient,
    text: String,
    parameters: HashMap<String, Value>,
}

impl<'c> Statement<'c> {
    pub(crate) fn new(client: &'c Neo4jClient, text: impl Into<String>) -> Self {
        Self {
            client,
            text: text.into(),
            parameters: HashMap::new(),
        }
    }

    /// Bind a named parameter. Accepts any type that converts to `BoltType`.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Bind every `(name, value)` pair of `params`.
    pub fn params<K, V, I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.parameters
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &HashMap<String, Value> {
        &self.parameters
    }

    /// Convert into the request a driver receives.
    pub fn into_request(self) -> QueryRequest<Value> {
        QueryRequest::with_parameters(self.text, Some(self.parameters))
    }

    /// Publish the rows of this statement.
    pub fn publish(self) -> RecordPublisher {
        let client = self.client;
        let (text, parameters) = self.into_request().into_parts();
        client.execute_with(text, Some(parameters))
    }

    /// Stream the rows of this statement.
    pub fn stream(self) -> RecordStream {
        RecordStream::new(self.publish())
    }

    /// Stream with an explicit demand window; see
    /// [`RecordStream::with_prefetch`].
    pub fn stream_with_prefetch(self, prefetch: u64) -> RecordStream {
        RecordStream::with_prefetch(self.publish(), prefetch)
    }

    /// Collect all rows.
    pub async fn fetch_all(self) -> Result<Vec<Row>, ClientError> {
        self.stream().try_collect().await
    }

    /// Return the first row, or `None` for an empty result. Only one row is
    /// requested; the rest of the result is cancelled.
    pub async fn fetch_optional(self) -> Result<Option<Row>, ClientError> {
        let mut stream = self.stream_with_prefetch(1);
        stream.next().await.transpose()
    }

    /// Return the first row.
    ///
    /// Returns [`ClientError::NoRows`] if the result is empty.
    pub async fn fetch_one(self) -> Result<Row, ClientError> {
        self.fetch_optional().await?.ok_or(ClientError::NoRows)
    }
}
