//! Index handles and index lifecycle operations.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

use crate::{
    admin::{AnalyzeOptions, StatsOptions},
    client::{Client, ClientInner},
    document::{GetResult, MultiGet, MultiGetResult},
    error::{ElasticalError, Result},
    percolator::PercolateResult,
    request::{Names, RequestOptions},
    response::Payload,
    search::{CountOptions, CountResult, SearchOptions, SearchResults},
    shape,
};

/// Handle for one named index.
///
/// Obtained from [`Client::get_index`]; the client keeps one handle per name.
/// The handle does not keep its client alive, and calls made after the last
/// client clone is dropped fail with [`ElasticalError::Disconnected`].
pub struct Index {
    client: Weak<ClientInner>,
    name: String,
}

impl Index {
    pub(crate) fn new(client: &Client, name: &str) -> Self {
        Self {
            client: client.downgrade(),
            name: name.to_string(),
        }
    }

    /// Index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning client.
    pub fn client(&self) -> Result<Client> {
        self.client
            .upgrade()
            .map(Client::from_inner)
            .ok_or(ElasticalError::Disconnected)
    }

    /// Encoded path segment for this index.
    pub(crate) fn segment(&self) -> String {
        shape::encode(&self.name)
    }

    /// Delete this index.
    pub async fn delete_index(&self) -> Result<Payload> {
        delete(&self.client()?, Names::from(self.name())).await
    }

    /// Whether this index exists. Any failure reads as `false`.
    pub async fn exists(&self) -> bool {
        self.probe().await.exists()
    }

    /// Three-way existence check for this index.
    pub async fn probe(&self) -> Existence {
        match self.client() {
            Ok(client) => probe(&client, Names::from(self.name())).await,
            Err(err) => Existence::Unknown(err),
        }
    }

    /// Refresh this index.
    pub async fn refresh(&self) -> Result<Payload> {
        refresh(&self.client()?, Names::from(self.name())).await
    }

    /// Search this index. An `index` already set on the options is replaced.
    pub async fn search(&self, options: SearchOptions) -> Result<SearchResults> {
        let mut scope = Map::new();
        scope.insert("index".to_string(), Value::String(self.name.clone()));
        let bag = shape::merge(&[&options.to_bag(), &scope]);
        self.client()?.search_bag(bag).await
    }

    /// Count documents in this index.
    pub async fn count(&self, options: CountOptions) -> Result<CountResult> {
        self.client()?.count(options.index(self.name())).await
    }

    /// Statistics for this index.
    pub async fn stats(&self, options: StatsOptions) -> Result<Payload> {
        self.client()?.stats(options.index(self.name())).await
    }

    /// Mapping for this index, optionally narrowed to one type.
    pub async fn get_mapping(&self, doc_type: Option<&str>) -> Result<Payload> {
        self.client()?.get_mapping(self.name(), doc_type).await
    }

    /// Put a mapping for a type in this index.
    pub async fn put_mapping(&self, doc_type: &str, mapping: Value) -> Result<Payload> {
        self.client()?.put_mapping(self.name(), doc_type, mapping).await
    }

    /// Settings for this index.
    pub async fn get_settings(&self) -> Result<Payload> {
        self.client()?.get_settings(self.name()).await
    }

    /// Update settings for this index.
    pub async fn update_settings(&self, settings: Value) -> Result<Payload> {
        self.client()?.update_settings(self.name(), settings).await
    }

    /// Aliases pointing at this index.
    pub async fn get_aliases(&self) -> Result<Payload> {
        self.client()?.get_aliases(self.name()).await
    }

    /// Analyze text with this index's analyzers.
    pub async fn analyze(&self, text: &str, options: AnalyzeOptions) -> Result<Payload> {
        self.client()?.analyze(text, options.index(self.name())).await
    }

    /// Fetch several documents; an index already set on the request wins.
    pub async fn multi_get(&self, request: MultiGet) -> Result<MultiGetResult> {
        let request = match request.target_index() {
            Some(_) => request,
            None => request.index(self.name()),
        };
        self.client()?.multi_get(request).await
    }

    /// Register a percolator query against this index.
    pub async fn set_percolator(&self, name: &str, query: Value) -> Result<Payload> {
        self.client()?.set_percolator(self.name(), name, query).await
    }

    /// Fetch a percolator query registered against this index.
    pub async fn get_percolator(&self, name: &str) -> Result<GetResult> {
        self.client()?.get_percolator(self.name(), name).await
    }

    /// Remove a percolator query registered against this index.
    pub async fn delete_percolator(&self, name: &str) -> Result<Payload> {
        self.client()?.delete_percolator(self.name(), name).await
    }

    /// Match a document against this index's percolator queries.
    pub async fn percolate(&self, doc_type: &str, document: Value) -> Result<PercolateResult> {
        self.client()?.percolate(self.name(), doc_type, document).await
    }

    /// Create or replace a river.
    pub async fn put_river(&self, name: &str, config: Value) -> Result<Payload> {
        self.client()?.put_river(name, config).await
    }

    /// Fetch a river's configuration.
    pub async fn get_river(&self, name: &str) -> Result<Payload> {
        self.client()?.get_river(name).await
    }

    /// Delete a river.
    pub async fn delete_river(&self, name: &str) -> Result<Payload> {
        self.client()?.delete_river(name).await
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("name", &self.name)
            .field("connected", &(self.client.strong_count() > 0))
            .finish()
    }
}

/// Outcome of an existence probe.
#[derive(Debug)]
pub enum Existence {
    /// The server confirmed every named index.
    Exists,
    /// The server answered 404.
    Absent,
    /// The check itself failed.
    Unknown(ElasticalError),
}

impl Existence {
    /// Collapse to a boolean; only [`Existence::Exists`] is `true`.
    pub fn exists(&self) -> bool {
        matches!(self, Existence::Exists)
    }
}

pub(crate) async fn create(
    client: &Client,
    name: &str,
    options: Option<Value>,
) -> Result<(Arc<Index>, Payload)> {
    debug!(index = name, "Creating index");
    let path = format!("/{}", shape::encode(name));
    let payload = client
        .request(&path, RequestOptions::put().json_opt(options))
        .await?;
    Ok((client.get_index(name), payload))
}

pub(crate) async fn delete(client: &Client, names: Names) -> Result<Payload> {
    debug!(indices = %names.joined(), "Deleting index");
    let path = format!("/{}", names.segment());
    client.request(&path, RequestOptions::delete()).await
}

pub(crate) async fn probe(client: &Client, names: Names) -> Existence {
    let path = format!("/{}", names.segment());
    match client.request(&path, RequestOptions::head()).await {
        Ok(_) => Existence::Exists,
        Err(err) if err.status().is_some_and(|s| s.as_u16() == 404) => Existence::Absent,
        Err(err) => Existence::Unknown(err),
    }
}

pub(crate) async fn exists(client: &Client, names: Names) -> bool {
    probe(client, names).await.exists()
}

pub(crate) async fn refresh(client: &Client, names: Names) -> Result<Payload> {
    let path = format!("/{}/_refresh", names.segment_or("_all"));
    client.request(&path, RequestOptions::post()).await
}
