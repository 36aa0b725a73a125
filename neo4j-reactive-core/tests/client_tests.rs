mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use common::{recorder, ScriptedCursor, TestError};
use futures::future::BoxFuture;
use futures::TryStreamExt;
use neo4j_reactive_core::{Driver, Publisher, QueryRequest, ReactiveClient, Signal, VoidSignal};

const RECORDS: [&str; 5] = ["r1", "r2", "r3", "r4", "r5"];

#[derive(Default)]
struct DriverState {
    opened: Mutex<Vec<QueryRequest<i64>>>,
    closes: AtomicUsize,
}

/// Serves `limit` records (default 3) from [`RECORDS`]; "invalid" fails.
#[derive(Default)]
struct MockDriver {
    state: Arc<DriverState>,
}

impl Driver for MockDriver {
    type Value = i64;
    type Cursor = ScriptedCursor;

    fn open_cursor(
        &self,
        request: QueryRequest<i64>,
    ) -> BoxFuture<'static, Result<ScriptedCursor, TestError>> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            if request.text() == "invalid" {
                return Err(TestError(format!("cannot parse '{}'", request.text())));
            }
            let limit = request.parameters().get("limit").copied().unwrap_or(3) as usize;
            state.opened.lock().unwrap().push(request);
            Ok(ScriptedCursor::items(&RECORDS[..limit]).0)
        })
    }

    fn close(&self) -> BoxFuture<'static, Result<(), TestError>> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            state.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

fn client() -> (ReactiveClient<MockDriver>, Arc<DriverState>) {
    let driver = MockDriver::default();
    let state = Arc::clone(&driver.state);
    (ReactiveClient::new(driver), state)
}

#[tokio::test]
async fn test_execute_uses_empty_parameters() {
    let (client, state) = client();
    let rows: Vec<&'static str> = client
        .execute("MATCH (n) RETURN n")
        .into_stream()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(rows, ["r1", "r2", "r3"]);
    let opened = state.opened.lock().unwrap();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].text(), "MATCH (n) RETURN n");
    assert!(opened[0].parameters().is_empty());
}

#[tokio::test]
async fn test_execute_with_parameters() {
    let (client, state) = client();
    let params = HashMap::from([("limit".to_string(), 5_i64)]);
    let rows: Vec<&'static str> = client
        .execute_with("UNWIND range(1, $limit) AS n RETURN n", Some(params))
        .into_stream()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(rows, RECORDS);
    assert_eq!(state.opened.lock().unwrap()[0].parameters().get("limit"), Some(&5));
}

#[test]
fn test_absent_parameters_become_empty() {
    let request = QueryRequest::<i64>::with_parameters("RETURN 1", None);
    assert!(request.parameters().is_empty());
    let (text, params) = request.into_parts();
    assert_eq!(text, "RETURN 1");
    assert!(params.is_empty());
}

#[tokio::test]
async fn test_cursor_is_not_opened_before_demand() {
    let (client, state) = client();
    let (subscriber, mut observed) = recorder(0);
    client.execute("RETURN 1").subscribe(subscriber);

    observed.expect_quiet().await;
    assert!(state.opened.lock().unwrap().is_empty());

    observed.subscription().request(1);
    assert_eq!(observed.next_signal().await, Signal::Next("r1"));
    assert_eq!(state.opened.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_each_execute_opens_independent_cursor() {
    let (client, state) = client();
    let mut first = client.execute("RETURN 1").into_stream_with_prefetch(1);
    let mut second = client.execute("RETURN 2").into_stream_with_prefetch(1);

    assert_eq!(first.next().await, Some(Ok("r1")));
    assert_eq!(second.next().await, Some(Ok("r1")));
    assert_eq!(second.next().await, Some(Ok("r2")));
    assert_eq!(first.next().await, Some(Ok("r2")));
    assert_eq!(state.opened.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_query_signals_error() {
    let (client, _state) = client();
    let (subscriber, mut observed) = recorder::<&'static str>(1);
    client.execute("invalid").subscribe(subscriber);

    assert_eq!(
        observed.next_signal().await,
        Signal::Error(TestError("cannot parse 'invalid'".into()))
    );
    observed.released().await;
}

#[tokio::test]
async fn test_close_emits_void_signal() {
    let (client, state) = client();
    let signals: Vec<VoidSignal> = client.close().into_stream().try_collect().await.unwrap();

    assert_eq!(signals, vec![VoidSignal]);
    assert_eq!(state.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_close_is_lazy_and_repeatable() {
    let (client, state) = client();
    let pending = client.close();
    assert_eq!(state.closes.load(Ordering::SeqCst), 0);

    let (subscriber, mut observed) = recorder(1);
    pending.subscribe(subscriber);
    assert_eq!(observed.take(2).await, vec![Signal::Next(VoidSignal), Signal::Complete]);

    let again: Vec<VoidSignal> = client.close().into_stream().try_collect().await.unwrap();
    assert_eq!(again, vec![VoidSignal]);
    assert_eq!(state.closes.load(Ordering::SeqCst), 2);
}
