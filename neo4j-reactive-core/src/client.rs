//! Driver-agnostic client exposing query results as publishers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use tokio::runtime::Handle;
use tracing::debug;

use crate::cursor::{Deferred, Driver, DriverError, QueryRequest};
use crate::fetch::CursorPublisher;
use crate::signal::VoidSignal;

/// Publisher returned by [`ReactiveClient::close`].
pub type ClosePublisher<E> = CursorPublisher<Deferred<VoidSignal, E>>;

/// Turns every submitted query into an independent [`CursorPublisher`].
///
/// Cursors are opened lazily, on the first demand of the publisher's
/// subscriber, and all fetching runs on the tokio runtime the client was
/// bound to.
pub struct ReactiveClient<D: Driver> {
    driver: Arc<D>,
    runtime: Handle,
}

impl<D: Driver> ReactiveClient<D> {
    /// Bind `driver` to the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn new(driver: D) -> Self {
        Self::with_runtime(driver, Handle::current())
    }

    pub fn with_runtime(driver: D, runtime: Handle) -> Self {
        Self {
            driver: Arc::new(driver),
            runtime,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Run `query` without parameters.
    pub fn execute(&self, query: impl Into<String>) -> CursorPublisher<D::Cursor> {
        self.execute_with(query, None)
    }

    /// Run `query` with named parameters; `None` means no parameters.
    pub fn execute_with(
        &self,
        query: impl Into<String>,
        parameters: Option<HashMap<String, D::Value>>,
    ) -> CursorPublisher<D::Cursor> {
        self.submit(QueryRequest::with_parameters(query, parameters))
    }

    /// Run a prepared [`QueryRequest`].
    pub fn submit(&self, request: QueryRequest<D::Value>) -> CursorPublisher<D::Cursor> {
        debug!(query = request.text(), parameters = request.parameters().len(), "submitting query");
        CursorPublisher::new(self.driver.open_cursor(request), self.runtime.clone())
    }

    /// Close the underlying driver once subscribed and requested.
    ///
    /// The publisher emits a single [`VoidSignal`] and completes, or fails with
    /// the driver's error. Closing an already closed client succeeds again.
    pub fn close(&self) -> ClosePublisher<DriverError<D>> {
        let driver = Arc::clone(&self.driver);
        let closing = async move {
            debug!("closing driver");
            driver.close().await.map(|()| VoidSignal)
        };
        CursorPublisher::from_cursor(Deferred::new(closing.boxed()), self.runtime.clone())
    }
}

impl<D: Driver> Clone for ReactiveClient<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            runtime: self.runtime.clone(),
        }
    }
}

impl<D: Driver + fmt::Debug> fmt::Debug for ReactiveClient<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveClient").field("driver", &self.driver).finish_non_exhaustive()
    }
}
