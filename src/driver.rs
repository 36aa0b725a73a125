//! `neo4rs` implementation of the core [`Driver`] and [`Cursor`] traits.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::BoxFuture;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use neo4j_reactive_core::{Cursor, Driver, QueryRequest};
use neo4rs::{BoltType as Value, Graph, Row};
use tracing::debug;

use crate::error::ClientError;

/// Opens cursors on a [`Graph`] connection pool.
///
/// Closing drops this driver's handle on the pool; queries submitted
/// afterwards fail with [`ClientError::Closed`].
pub struct GraphDriver {
    graph: Arc<RwLock<Option<Graph>>>,
}

impl GraphDriver {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph: Arc::new(RwLock::new(Some(graph))),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.graph.read().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

impl fmt::Debug for GraphDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphDriver").field("closed", &self.is_closed()).finish()
    }
}

impl Driver for GraphDriver {
    type Value = Value;
    type Cursor = RowCursor;

    fn open_cursor(
        &self,
        request: QueryRequest<Value>,
    ) -> BoxFuture<'static, Result<RowCursor, ClientError>> {
        let graph = Arc::clone(&self.graph);
        Box::pin(async move {
            let graph = graph
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
                .ok_or(ClientError::Closed)?;

            let (text, parameters) = request.into_parts();
            let mut query = neo4rs::query(&text);
            for (key, value) in parameters {
                query = query.param(&key, value);
            }
            let detached = graph.execute(query).await?;
            Ok(RowCursor {
                rows: detached.into_stream().into_stream().boxed(),
            })
        })
    }

    fn close(&self) -> BoxFuture<'static, Result<(), ClientError>> {
        let graph = Arc::clone(&self.graph);
        Box::pin(async move {
            let released = graph.write().unwrap_or_else(PoisonError::into_inner).take();
            if released.is_some() {
                debug!("released connection pool");
            }
            Ok(())
        })
    }
}

/// Row-at-a-time cursor over a query result.
pub struct RowCursor {
    rows: BoxStream<'static, Result<Row, neo4rs::Error>>,
}

impl Cursor for RowCursor {
    type Item = Row;
    type Error = ClientError;

    fn fetch_next(&mut self) -> BoxFuture<'_, Result<Option<Row>, ClientError>> {
        Box::pin(async move { Ok(self.rows.next().await.transpose()?) })
    }
}
