//! Connection handle.

use elastical_transport::{HttpTransport, Transport, TransportRequest};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

use crate::{
    config::ConnectionConfig,
    document::{DeleteOptions, GetOptions, GetResult, IndexOptions},
    error::{ElasticalError, Result},
    index::{self, Existence, Index},
    request::{Names, RequestOptions},
    response::{Payload, classify},
};

/// Callback invoked with the fully assembled request instead of sending it.
pub type RequestHook = Arc<dyn Fn(&TransportRequest) + Send + Sync>;

pub(crate) struct ClientInner {
    config: RwLock<ConnectionConfig>,
    transport: Arc<dyn Transport>,
    indices: Mutex<HashMap<String, Arc<Index>>>,
    hook: RwLock<Option<RequestHook>>,
}

/// Client for a search server's REST API.
///
/// Cloning is cheap and clones share configuration, transport and index
/// handles.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Create a client using the default HTTP transport.
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Create a client on top of a custom transport.
    pub fn with_transport(config: ConnectionConfig, transport: Arc<dyn Transport>) -> Self {
        debug!(url = %config.base_url_redacted(), "Initializing client");
        Self {
            inner: Arc::new(ClientInner {
                config: RwLock::new(config),
                transport,
                indices: Mutex::new(HashMap::new()),
                hook: RwLock::new(None),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ClientInner> {
        Arc::downgrade(&self.inner)
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> ConnectionConfig {
        self.inner.config.read().clone()
    }

    /// Base URL derived from the current configuration.
    pub fn base_url(&self) -> String {
        self.inner.config.read().base_url()
    }

    /// Mutate the configuration. Takes effect on the next request.
    pub fn configure(&self, update: impl FnOnce(&mut ConnectionConfig)) {
        update(&mut *self.inner.config.write());
    }

    /// Install a hook that receives each assembled request in place of the
    /// transport. Hooked calls fail with [`ElasticalError::Intercepted`].
    pub fn set_request_hook(&self, hook: impl Fn(&TransportRequest) + Send + Sync + 'static) {
        *self.inner.hook.write() = Some(Arc::new(hook));
    }

    /// Remove the request hook.
    pub fn clear_request_hook(&self) {
        *self.inner.hook.write() = None;
    }

    /// Whether two clients share one connection handle.
    pub fn same_connection(&self, other: &Client) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Handle for the named index.
    ///
    /// Handles are cached per client: the same name always yields the same
    /// `Arc`.
    pub fn get_index(&self, name: &str) -> Arc<Index> {
        let mut indices = self.inner.indices.lock();
        indices
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Index::new(self, name)))
            .clone()
    }

    /// Send a request to `path` (which may already carry a query string).
    ///
    /// Per-call transport options are merged over the configured defaults,
    /// the timeout falls back to [`ConnectionConfig::timeout`], and the
    /// response is classified by status.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Payload> {
        let request = {
            let config = self.inner.config.read();
            let url = config.url_for(path)?;
            let mut transport = options.transport.merged_over(&config.transport);
            transport.timeout.get_or_insert(config.timeout);

            let mut request = TransportRequest::new(options.method, url).with_options(transport);
            if let Some(body) = options.body {
                request = request.with_body(body);
            }
            request
        };

        let hook = self.inner.hook.read().clone();
        if let Some(hook) = hook {
            debug!(method = %request.method, path = %request.url.path(), "Request captured by hook");
            hook(&request);
            return Err(ElasticalError::Intercepted(Box::new(request)));
        }

        debug!(method = %request.method, path = %request.url.path(), "Dispatching request");
        let raw = self.inner.transport.perform(request).await?;
        debug!(status = %raw.status(), "Request completed");

        classify(raw)
    }

    // =========================================================================
    // Index lifecycle
    // =========================================================================

    /// Create an index. The body is sent only when `options` is given.
    pub async fn create_index(
        &self,
        name: &str,
        options: impl Into<Option<Value>>,
    ) -> Result<(Arc<Index>, Payload)> {
        index::create(self, name, options.into()).await
    }

    /// Delete indices. An empty list deletes **every** index.
    pub async fn delete_index(&self, names: impl Into<Names>) -> Result<Payload> {
        index::delete(self, names.into()).await
    }

    /// Whether all the named indices exist. Any failure reads as `false`.
    pub async fn index_exists(&self, names: impl Into<Names>) -> bool {
        index::exists(self, names.into()).await
    }

    /// Like [`index_exists`](Self::index_exists), but keeps failures apart
    /// from a definite absence.
    pub async fn probe_index(&self, names: impl Into<Names>) -> Existence {
        index::probe(self, names.into()).await
    }

    /// Refresh indices; an empty list refreshes all of them.
    pub async fn refresh(&self, names: impl Into<Names>) -> Result<Payload> {
        index::refresh(self, names.into()).await
    }

    // =========================================================================
    // Document operations
    // =========================================================================

    /// Get a document by id.
    pub async fn get(&self, index: &str, id: &str, options: GetOptions) -> Result<GetResult> {
        self.get_index(index).get(id, options).await
    }

    /// Index a document.
    pub async fn index(
        &self,
        index: &str,
        doc_type: &str,
        document: Value,
        options: IndexOptions,
    ) -> Result<Payload> {
        self.get_index(index)
            .index(doc_type, document, options)
            .await
    }

    /// Alias for [`index`](Self::index).
    pub async fn set(
        &self,
        index: &str,
        doc_type: &str,
        document: Value,
        options: IndexOptions,
    ) -> Result<Payload> {
        self.index(index, doc_type, document, options).await
    }

    /// Delete a document, or every document matching
    /// [`DeleteOptions::query`].
    pub async fn delete(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        options: DeleteOptions,
    ) -> Result<Payload> {
        self.get_index(index).delete(doc_type, id, options).await
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ConnectionConfig::default())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.config.read().base_url_redacted())
            .field("indices", &self.inner.indices.lock().len())
            .field("hooked", &self.inner.hook.read().is_some())
            .finish()
    }
}
