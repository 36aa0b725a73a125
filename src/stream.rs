//! Pull-based access to query results.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{FusedStream, Stream};
use neo4j_reactive_core::{Publisher, PublisherStream, DEFAULT_PREFETCH};
use neo4rs::Row;

use crate::client::RecordPublisher;
use crate::error::ClientError;

/// A stream of rows backed by a [`RecordPublisher`].
///
/// At most `prefetch` rows are requested ahead of the consumer; more are
/// requested as rows are taken. Dropping the stream cancels the query and
/// releases its cursor.
///
/// # Example
///
/// ```rust,no_run
/// # async fn example(client: &neo4j_reactive::Neo4jClient) -> Result<(), neo4j_reactive::ClientError> {
/// let mut rows = client.query("MATCH (u:User) RETURN u.name AS name").stream();
/// while let Some(row) = rows.next().await {
///     let row = row?;
///     println!("{:?}", row.get::<String>("name").ok());
/// }
/// # Ok(())
/// # }
/// ```
pub struct RecordStream {
    inner: PublisherStream<Row, ClientError>,
}

impl RecordStream {
    pub fn new(publisher: RecordPublisher) -> Self {
        Self::with_prefetch(publisher, DEFAULT_PREFETCH)
    }

    /// Keep `prefetch` rows of demand outstanding. Zero is treated as one.
    pub fn with_prefetch(publisher: RecordPublisher, prefetch: u64) -> Self {
        Self {
            inner: publisher.into_stream_with_prefetch(prefetch),
        }
    }

    /// Pull the next row.
    ///
    /// Returns `None` when the result is exhausted or after an error.
    pub async fn next(&mut self) -> Option<Result<Row, ClientError>> {
        self.inner.next().await
    }
}

impl From<RecordPublisher> for RecordStream {
    fn from(publisher: RecordPublisher) -> Self {
        Self::new(publisher)
    }
}

impl Stream for RecordStream {
    type Item = Result<Row, ClientError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl FusedStream for RecordStream {
    fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }
}
