//! Interfaces consumed from the underlying database driver.

use std::collections::HashMap;
use std::fmt;

use futures::future::BoxFuture;

/// One-record-at-a-time asynchronous result handle.
///
/// Callers never invoke [`fetch_next`](Cursor::fetch_next) again while a
/// previous call is still outstanding.
pub trait Cursor: Send + 'static {
    type Item: Send + 'static;
    type Error: Send + 'static;

    /// Fetch the next record. `Ok(None)` signals end-of-data.
    fn fetch_next(&mut self) -> BoxFuture<'_, Result<Option<Self::Item>, Self::Error>>;
}

/// Error type produced by a driver's cursors.
pub type DriverError<D> = <<D as Driver>::Cursor as Cursor>::Error;

/// A session-like handle able to open cursors for submitted queries.
pub trait Driver: Send + Sync + 'static {
    /// Parameter value type accepted by the driver.
    type Value: Send + 'static;
    type Cursor: Cursor;

    /// Submit `request` and resolve to a cursor over its results.
    ///
    /// The returned future must not do any work until first polled.
    fn open_cursor(
        &self,
        request: QueryRequest<Self::Value>,
    ) -> BoxFuture<'static, Result<Self::Cursor, DriverError<Self>>>;

    /// Tear down the connection. Closing twice must succeed.
    fn close(&self) -> BoxFuture<'static, Result<(), DriverError<Self>>>;
}

/// Query text plus named parameters, consumed once to open a cursor.
#[derive(Clone, PartialEq)]
pub struct QueryRequest<V> {
    text: String,
    parameters: HashMap<String, V>,
}

impl<V> QueryRequest<V> {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_parameters(text, None)
    }

    /// Build a request; an absent parameter map becomes an empty one.
    pub fn with_parameters(
        text: impl Into<String>,
        parameters: Option<HashMap<String, V>>,
    ) -> Self {
        Self {
            text: text.into(),
            parameters: parameters.unwrap_or_default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &HashMap<String, V> {
        &self.parameters
    }

    pub fn into_parts(self) -> (String, HashMap<String, V>) {
        (self.text, self.parameters)
    }
}

impl<V> fmt::Debug for QueryRequest<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.parameters.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("QueryRequest")
            .field("text", &self.text)
            .field("parameters", &keys)
            .finish()
    }
}

/// A cursor over the single value of a future.
///
/// Yields the resolved value once, then end-of-data. A failed future becomes
/// the cursor's fetch error.
pub struct Deferred<T, E> {
    pending: Option<BoxFuture<'static, Result<T, E>>>,
}

impl<T, E> Deferred<T, E> {
    pub fn new(pending: BoxFuture<'static, Result<T, E>>) -> Self {
        Self { pending: Some(pending) }
    }
}

impl<T, E> Cursor for Deferred<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Item = T;
    type Error = E;

    fn fetch_next(&mut self) -> BoxFuture<'_, Result<Option<T>, E>> {
        let pending = self.pending.take();
        Box::pin(async move {
            match pending {
                Some(fut) => fut.await.map(Some),
                None => Ok(None),
            }
        })
    }
}
