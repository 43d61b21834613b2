//! Document operations: get, index, delete and multi-get.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::{
    client::Client,
    error::Result,
    index::Index,
    request::{QueryParams, RequestOptions},
    response::Payload,
    shape::{self, insert_some, take, truthy},
};

/// Options for [`Index::get`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetOptions {
    /// Restrict the lookup to one type. Defaults to `_all`.
    pub doc_type: Option<String>,
    /// Fields to return instead of the full source.
    pub fields: Vec<String>,
    /// Resolve a missing index or document to `document: None` instead of
    /// an error.
    pub ignore_missing: bool,
    /// Shard replica preference.
    pub preference: Option<String>,
    /// Realtime get.
    pub realtime: Option<bool>,
    /// Refresh the shard before reading.
    pub refresh: Option<bool>,
    /// Routing value.
    pub routing: Option<String>,
    /// Extra query parameters, passed through unchanged.
    pub params: Map<String, Value>,
}

impl GetOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a type.
    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// Return only these fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Treat a missing document as an empty result.
    pub fn ignore_missing(mut self, ignore: bool) -> Self {
        self.ignore_missing = ignore;
        self
    }

    /// Set the replica preference.
    pub fn preference(mut self, preference: impl Into<String>) -> Self {
        self.preference = Some(preference.into());
        self
    }

    /// Enable or disable realtime get.
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = Some(realtime);
        self
    }

    /// Refresh before reading.
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// Set the routing value.
    pub fn routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }

    /// Add a pass-through query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    fn to_bag(&self) -> Map<String, Value> {
        let mut bag = Map::new();
        insert_some(&mut bag, "type", self.doc_type.clone());
        if !self.fields.is_empty() {
            bag.insert("fields".to_string(), json!(self.fields));
        }
        insert_some(&mut bag, "preference", self.preference.clone());
        insert_some(&mut bag, "realtime", self.realtime);
        insert_some(&mut bag, "refresh", self.refresh);
        insert_some(&mut bag, "routing", self.routing.clone());
        shape::merge(&[&bag, &self.params])
    }
}

/// A fetched document.
#[derive(Debug, Clone, PartialEq)]
pub struct GetResult {
    /// The requested fields if any were asked for, otherwise `_source`.
    /// `None` when the document was missing and missing documents were
    /// ignored.
    pub document: Option<Value>,
    /// Full response body.
    pub response: Payload,
}

impl GetResult {
    pub(crate) fn from_response(response: Payload) -> Self {
        let document = response
            .get("fields")
            .or_else(|| response.get("_source"))
            .cloned();
        Self { document, response }
    }
}

/// Options for [`Index::index`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexOptions {
    /// Document id. Without one the server generates an id and the request
    /// is a POST.
    pub id: Option<String>,
    /// Fail if the document already exists (`op_type=create`).
    pub create: bool,
    /// Write consistency (`one`, `quorum`, `all`).
    pub consistency: Option<String>,
    /// Parent document id.
    pub parent: Option<String>,
    /// Percolation query to check the document against.
    pub percolate: Option<String>,
    /// Make the document searchable immediately.
    pub refresh: Option<bool>,
    /// Replication mode (`sync`, `async`).
    pub replication: Option<String>,
    /// Routing value.
    pub routing: Option<String>,
    /// Primary shard wait, such as `"1m"`.
    pub timeout: Option<String>,
    /// Expected document version.
    pub version: Option<u64>,
    /// Version type. Defaults to `external` when a version is given.
    pub version_type: Option<String>,
    /// Extra query parameters, passed through unchanged.
    pub params: Map<String, Value>,
}

impl IndexOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Only create, never overwrite.
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Set write consistency.
    pub fn consistency(mut self, consistency: impl Into<String>) -> Self {
        self.consistency = Some(consistency.into());
        self
    }

    /// Set the parent id.
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the percolation query.
    pub fn percolate(mut self, percolate: impl Into<String>) -> Self {
        self.percolate = Some(percolate.into());
        self
    }

    /// Refresh after indexing.
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// Set the replication mode.
    pub fn replication(mut self, replication: impl Into<String>) -> Self {
        self.replication = Some(replication.into());
        self
    }

    /// Set the routing value.
    pub fn routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }

    /// Set the primary shard wait.
    pub fn timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Set the expected version.
    pub fn version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the version type.
    pub fn version_type(mut self, version_type: impl Into<String>) -> Self {
        self.version_type = Some(version_type.into());
        self
    }

    /// Add a pass-through query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    fn to_bag(&self) -> Map<String, Value> {
        let mut bag = Map::new();
        insert_some(&mut bag, "consistency", self.consistency.clone());
        if self.create {
            bag.insert("create".to_string(), Value::Bool(true));
        }
        insert_some(&mut bag, "id", self.id.clone());
        insert_some(&mut bag, "parent", self.parent.clone());
        insert_some(&mut bag, "percolate", self.percolate.clone());
        insert_some(&mut bag, "refresh", self.refresh);
        insert_some(&mut bag, "replication", self.replication.clone());
        insert_some(&mut bag, "routing", self.routing.clone());
        insert_some(&mut bag, "timeout", self.timeout.clone());
        insert_some(&mut bag, "version", self.version);
        insert_some(&mut bag, "version_type", self.version_type.clone());
        shape::merge(&[&bag, &self.params])
    }
}

/// Options for [`Index::delete`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOptions {
    /// Delete every document of the type matching this query instead of a
    /// single id.
    pub query: Option<Value>,
    /// Resolve a missing document to success.
    pub ignore_missing: bool,
    /// Write consistency.
    pub consistency: Option<String>,
    /// Parent document id.
    pub parent: Option<String>,
    /// Refresh the shard afterwards.
    pub refresh: Option<bool>,
    /// Replication mode.
    pub replication: Option<String>,
    /// Routing value.
    pub routing: Option<String>,
    /// Expected document version.
    pub version: Option<u64>,
    /// Extra query parameters, passed through unchanged.
    pub params: Map<String, Value>,
}

impl DeleteOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete by query.
    pub fn query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    /// Treat a missing document as success.
    pub fn ignore_missing(mut self, ignore: bool) -> Self {
        self.ignore_missing = ignore;
        self
    }

    /// Set write consistency.
    pub fn consistency(mut self, consistency: impl Into<String>) -> Self {
        self.consistency = Some(consistency.into());
        self
    }

    /// Set the parent id.
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Refresh afterwards.
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// Set the replication mode.
    pub fn replication(mut self, replication: impl Into<String>) -> Self {
        self.replication = Some(replication.into());
        self
    }

    /// Set the routing value.
    pub fn routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }

    /// Set the expected version.
    pub fn version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// Add a pass-through query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    fn to_bag(&self) -> Map<String, Value> {
        let mut bag = Map::new();
        insert_some(&mut bag, "consistency", self.consistency.clone());
        insert_some(&mut bag, "parent", self.parent.clone());
        insert_some(&mut bag, "refresh", self.refresh);
        insert_some(&mut bag, "replication", self.replication.clone());
        insert_some(&mut bag, "routing", self.routing.clone());
        insert_some(&mut bag, "version", self.version);
        shape::merge(&[&bag, &self.params])
    }
}

impl Index {
    /// Get a document by id.
    ///
    /// Looks across all types unless [`GetOptions::doc_type`] is set.
    pub async fn get(&self, id: &str, options: GetOptions) -> Result<GetResult> {
        let mut bag = options.to_bag();
        let doc_type = take(&mut bag, "type")
            .as_ref()
            .and_then(shape::query_value)
            .unwrap_or_else(|| "_all".to_string());

        let mut query = QueryParams::new();
        query.extend_map(&bag);

        let path = query.append_to(format!(
            "/{}/{}/{}",
            self.segment(),
            shape::encode(&doc_type),
            shape::encode(id)
        ));

        match self.client()?.request(&path, RequestOptions::get()).await {
            Ok(response) => Ok(GetResult::from_response(response)),
            Err(err) if options.ignore_missing && err.is_not_found() => Ok(GetResult {
                document: None,
                response: err.body().cloned().unwrap_or_default(),
            }),
            Err(err) => Err(err),
        }
    }

    /// Index a document. With an id the request is a PUT to that id,
    /// otherwise a POST that lets the server pick one.
    pub async fn index(
        &self,
        doc_type: &str,
        document: Value,
        options: IndexOptions,
    ) -> Result<Payload> {
        let mut bag = options.to_bag();

        if take(&mut bag, "create").is_some_and(|create| truthy(&create)) {
            bag.insert("op_type".to_string(), Value::from("create"));
        }

        let id = take(&mut bag, "id")
            .filter(truthy)
            .and_then(|id| shape::query_value(&id));

        let versioned = bag.get("version").is_some_and(truthy);
        let typed = bag.get("version_type").is_some_and(truthy);
        if versioned && !typed {
            bag.insert("version_type".to_string(), Value::from("external"));
        }

        let mut query = QueryParams::new();
        query.extend_map(&bag);

        let mut path = format!("/{}/{}", self.segment(), shape::encode(doc_type));
        let method = match &id {
            Some(id) => {
                path.push('/');
                path.push_str(&shape::encode(id));
                RequestOptions::put()
            }
            None => RequestOptions::post(),
        };

        self.client()?
            .request(&query.append_to(path), method.json(document))
            .await
    }

    /// Alias for [`index`](Self::index).
    pub async fn set(
        &self,
        doc_type: &str,
        document: Value,
        options: IndexOptions,
    ) -> Result<Payload> {
        self.index(doc_type, document, options).await
    }

    /// Delete a document by id, or by query when [`DeleteOptions::query`]
    /// is set.
    pub async fn delete(&self, doc_type: &str, id: &str, options: DeleteOptions) -> Result<Payload> {
        let mut query = QueryParams::new();
        query.extend_map(&options.to_bag());

        let base = format!("/{}/{}", self.segment(), shape::encode(doc_type));
        let (path, request) = match &options.query {
            Some(by_query) => (
                format!("{base}/_query"),
                RequestOptions::delete().json(by_query.clone()),
            ),
            None => (
                format!("{base}/{}", shape::encode(id)),
                RequestOptions::delete(),
            ),
        };

        match self.client()?.request(&query.append_to(path), request).await {
            Err(err) if options.ignore_missing && err.is_not_found() => {
                Ok(err.body().cloned().unwrap_or_default())
            }
            other => other,
        }
    }
}

/// One document coordinate in a [`MultiGet`] request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MultiGetDoc {
    /// Index, when not given on the request.
    #[serde(rename = "_index", skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Type, when not given on the request.
    #[serde(rename = "_type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Fields to return.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    /// Routing value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
}

impl MultiGetDoc {
    /// Coordinate for a document id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the index.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Set the type.
    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// Return only these fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the routing value.
    pub fn routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Targets {
    Docs(Vec<MultiGetDoc>),
    Ids(Vec<String>),
}

/// A multi-get request: `{docs: [...]}` or `{ids: [...]}` posted to
/// `[/{index}][/{type}]/_mget`.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiGet {
    index: Option<String>,
    doc_type: Option<String>,
    targets: Targets,
    params: Map<String, Value>,
}

impl MultiGet {
    /// Fetch documents by full coordinates.
    pub fn docs(docs: impl IntoIterator<Item = MultiGetDoc>) -> Self {
        Self::with_targets(Targets::Docs(docs.into_iter().collect()))
    }

    /// Fetch documents by id. Needs an index on the request or the handle.
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_targets(Targets::Ids(ids.into_iter().map(Into::into).collect()))
    }

    fn with_targets(targets: Targets) -> Self {
        Self {
            index: None,
            doc_type: None,
            targets,
            params: Map::new(),
        }
    }

    /// Default index.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Default type.
    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// Add a pass-through query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub(crate) fn target_index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    fn path(&self) -> String {
        let mut path = String::new();
        if let Some(index) = &self.index {
            path.push('/');
            path.push_str(&shape::encode(index));
        }
        if let Some(doc_type) = &self.doc_type {
            path.push('/');
            path.push_str(&shape::encode(doc_type));
        }
        path.push_str("/_mget");

        let mut query = QueryParams::new();
        query.extend_map(&self.params);
        query.append_to(path)
    }

    fn body(&self) -> Result<Value> {
        Ok(match &self.targets {
            Targets::Docs(docs) => json!({ "docs": serde_json::to_value(docs)? }),
            Targets::Ids(ids) => json!({ "ids": ids }),
        })
    }
}

/// Documents returned by a multi-get.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiGetResult {
    /// The `docs` array, in request order.
    pub docs: Vec<Value>,
    /// Full response body.
    pub response: Payload,
}

impl Client {
    /// Fetch several documents in one request.
    pub async fn multi_get(&self, request: MultiGet) -> Result<MultiGetResult> {
        let body = request.body()?;
        let response = self
            .request(&request.path(), RequestOptions::post().json(body))
            .await?;
        let docs = response
            .get("docs")
            .map(shape::values)
            .unwrap_or_default();
        Ok(MultiGetResult { docs, response })
    }
}
