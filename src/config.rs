//! Connection settings for [`Neo4jClient`](crate::Neo4jClient).

use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// Connection settings, converted into a [`neo4rs::Config`] on connect.
///
/// ```rust
/// # use neo4j_reactive::ClientConfig;
/// let config = ClientConfig::new("bolt://localhost:7687", "neo4j", "secret")
///     .with_db("movies")
///     .with_fetch_size(500);
/// assert_eq!(config.uri(), "bolt://localhost:7687");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    uri: String,
    user: String,
    password: String,
    db: Option<String>,
    fetch_size: Option<usize>,
    max_connections: Option<usize>,
}

impl ClientConfig {
    pub const DEFAULT_URI: &'static str = "bolt://localhost:7687";
    pub const DEFAULT_USER: &'static str = "neo4j";

    pub fn new(
        uri: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            user: user.into(),
            password: password.into(),
            db: None,
            fetch_size: None,
            max_connections: None,
        }
    }

    /// Read settings from the process environment.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `NEO4J_URI` | `bolt://localhost:7687` |
    /// | `NEO4J_USER` | `neo4j` |
    /// | `NEO4J_PASSWORD` | empty |
    /// | `NEO4J_DATABASE` | server default |
    /// | `NEO4J_FETCH_SIZE` | driver default |
    /// | `NEO4J_MAX_CONNECTIONS` | driver default |
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but resolving variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(
            lookup("NEO4J_URI").unwrap_or_else(|| Self::DEFAULT_URI.to_owned()),
            lookup("NEO4J_USER").unwrap_or_else(|| Self::DEFAULT_USER.to_owned()),
            lookup("NEO4J_PASSWORD").unwrap_or_default(),
        );
        config.db = lookup("NEO4J_DATABASE");
        config.fetch_size = parse_var(&lookup, "NEO4J_FETCH_SIZE")?;
        config.max_connections = parse_var(&lookup, "NEO4J_MAX_CONNECTIONS")?;
        Ok(config)
    }

    /// Target database; the server default when unset.
    pub fn with_db(mut self, db: impl Into<String>) -> Self {
        self.db = Some(db.into());
        self
    }

    /// Records pulled from the server per round trip.
    pub fn with_fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = Some(fetch_size);
        self
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = Some(max_connections);
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn db(&self) -> Option<&str> {
        self.db.as_deref()
    }

    pub fn fetch_size(&self) -> Option<usize> {
        self.fetch_size
    }

    pub fn max_connections(&self) -> Option<usize> {
        self.max_connections
    }

    /// Build the driver configuration.
    pub fn to_neo4rs(&self) -> Result<neo4rs::Config, ClientError> {
        let mut builder = neo4rs::ConfigBuilder::default()
            .uri(self.uri.as_str())
            .user(self.user.as_str())
            .password(self.password.as_str());
        if let Some(db) = &self.db {
            builder = builder.db(db.as_str());
        }
        if let Some(fetch_size) = self.fetch_size {
            builder = builder.fetch_size(fetch_size);
        }
        if let Some(max_connections) = self.max_connections {
            builder = builder.max_connections(max_connections);
        }
        Ok(builder.build()?)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_URI, Self::DEFAULT_USER, "")
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("db", &self.db)
            .field("fetch_size", &self.fetch_size)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ClientError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ClientError::config(key, format!("'{raw}': {e}")))
        })
        .transpose()
}
