#![doc = r#"
Reactive, backpressure-aware query results for Neo4j in Rust.

`neo4j-reactive` turns every query into a cold [`Publisher`] of rows. A
subscriber states how many rows it can take, and rows are pulled from the
server one at a time, never faster than requested. Built on [`neo4rs`] 0.8.

# Quick start

## Connect

```rust,no_run
use neo4j_reactive::prelude::*;

# async fn example() -> Result<(), ClientError> {
let client = Neo4jClient::new("bolt://localhost:7687", "neo4j", "secret").await?;

// Or from NEO4J_URI, NEO4J_USER, NEO4J_PASSWORD, ...
let client = Neo4jClient::connect(ClientConfig::from_env()?).await?;
# Ok(())
# }
```

## Subscribe with explicit demand

```rust,no_run
use neo4j_reactive::prelude::*;
use neo4rs::Row;

struct FirstTen {
    subscription: Option<Subscription>,
}

impl Subscriber<Row, ClientError> for FirstTen {
    fn on_subscribe(&mut self, subscription: Subscription) {
        subscription.request(10);
        self.subscription = Some(subscription);
    }

    fn on_next(&mut self, row: Row) {
        println!("{row:?}");
    }

    fn on_error(&mut self, error: ClientError) {
        eprintln!("query failed: {error}");
    }

    fn on_complete(&mut self) {}
}

# fn example(client: &Neo4jClient) {
client
    .execute("UNWIND range(1, 1000) AS n RETURN n")
    .subscribe(FirstTen { subscription: None });
# }
```

Calling [`Subscription::cancel`] stops fetching and releases the cursor.

## Stream

```rust,no_run
use futures::TryStreamExt;
use neo4j_reactive::prelude::*;

# async fn example(client: &Neo4jClient) -> Result<(), ClientError> {
// Parameters bound through the statement builder:
let rows: Vec<_> = client
    .query("MATCH (u:User) WHERE u.age > $age RETURN u")
    .param("age", 30_i64)
    .stream()
    .try_collect()
    .await?;

// Exactly one row (ClientError::NoRows if empty):
let row = client.query("RETURN 1 AS n").fetch_one().await?;
# Ok(())
# }
```

## Close

```rust,no_run
use neo4j_reactive::prelude::*;

# async fn example(client: Neo4jClient) -> Result<(), ClientError> {
let mut closing = client.close().into_stream();
assert_eq!(closing.next().await.transpose()?, Some(VoidSignal));
# Ok(())
# }
```

Queries executed after closing fail with [`ClientError::Closed`].

# Error handling

Driver failures surface once, as the terminal error of the publisher that
hit them, wrapped in [`ClientError::Neo4j`]. No record is emitted after an
error and nothing is retried.

[`neo4rs`]: https://docs.rs/neo4rs
"#]

pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod prelude;
pub mod query;
pub mod stream;

pub use neo4j_reactive_core as core;

pub use client::{ClosePublisher, Neo4jClient, RecordPublisher};
pub use config::ClientConfig;
pub use error::ClientError;
pub use neo4j_reactive_core::{Publisher, Signal, Subscriber, Subscription, VoidSignal};
pub use query::Statement;
pub use stream::RecordStream;
