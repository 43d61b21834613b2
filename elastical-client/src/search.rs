//! Search and count.

use elastical_transport::Method;
use serde_json::{Map, Value, json};

use crate::{
    client::Client,
    error::Result,
    request::{Names, QueryParams, RequestOptions},
    response::{Payload, check_shards},
    shape::{self, insert_some, take},
};

/// Options that always travel in the query string, never in the body.
const QUERY_STRING_OPTIONS: [&str; 7] = [
    "preference",
    "routing",
    "scroll",
    "scroll_id",
    "search_type",
    "timeout",
    "ignore_indices",
];

/// A search query: plain query-string syntax or a full DSL object.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Sent as `{"query_string": {"query": ...}}`.
    Text(String),
    /// Sent as given.
    Dsl(Value),
}

impl Query {
    fn to_value(&self) -> Value {
        match self {
            Query::Text(text) => Value::String(text.clone()),
            Query::Dsl(dsl) => dsl.clone(),
        }
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::Text(text.to_string())
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::Text(text)
    }
}

impl From<Value> for Query {
    fn from(dsl: Value) -> Self {
        match dsl {
            Value::String(text) => Query::Text(text),
            other => Query::Dsl(other),
        }
    }
}

/// Options for [`Client::search`].
///
/// Unknown keys go through [`SearchOptions::extra`] into the request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    /// The query.
    pub query: Option<Query>,
    /// Indices to search. Defaults to all.
    pub index: Names,
    /// Types to search. Defaults to all.
    pub doc_type: Names,
    /// Fields to return.
    pub fields: Vec<String>,
    /// Result offset.
    pub from: Option<u64>,
    /// Result count.
    pub size: Option<u64>,
    /// Sort specification.
    pub sort: Option<Value>,
    /// Post-query filter.
    pub filter: Option<Value>,
    /// Facets to compute.
    pub facets: Option<Value>,
    /// Highlighting options.
    pub highlight: Option<Value>,
    /// Explain scoring per hit.
    pub explain: Option<bool>,
    /// Return each hit's version.
    pub version: Option<bool>,
    /// Drop hits scoring below this.
    pub min_score: Option<f64>,
    /// Score hits even when sorting by field.
    pub track_scores: Option<bool>,
    /// Scripted fields.
    pub script_fields: Option<Value>,
    /// Per-index boosts.
    pub indices_boost: Option<Value>,
    /// Shard replica preference.
    pub preference: Option<String>,
    /// Routing value.
    pub routing: Option<String>,
    /// Keep a scroll cursor alive for this long, such as `"1m"`.
    pub scroll: Option<String>,
    /// Continue an existing scroll.
    pub scroll_id: Option<String>,
    /// Search type, such as `"scan"` or `"count"`.
    pub search_type: Option<String>,
    /// Server-side search timeout, such as `"5s"`.
    pub timeout: Option<String>,
    /// How to treat unavailable indices.
    pub ignore_indices: Option<String>,
    /// Additional body keys.
    pub extra: Map<String, Value>,
}

impl SearchOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query.
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Restrict to indices.
    pub fn index(mut self, index: impl Into<Names>) -> Self {
        self.index = index.into();
        self
    }

    /// Restrict to types.
    pub fn doc_type(mut self, doc_type: impl Into<Names>) -> Self {
        self.doc_type = doc_type.into();
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

    /// Set the result offset (`from`).
    pub fn offset(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the result count.
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the sort.
    pub fn sort(mut self, sort: Value) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the filter.
    pub fn filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the facets.
    pub fn facets(mut self, facets: Value) -> Self {
        self.facets = Some(facets);
        self
    }

    /// Set highlighting.
    pub fn highlight(mut self, highlight: Value) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// Explain scoring.
    pub fn explain(mut self, explain: bool) -> Self {
        self.explain = Some(explain);
        self
    }

    /// Return hit versions.
    pub fn version(mut self, version: bool) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the minimum score.
    pub fn min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Track scores when sorting.
    pub fn track_scores(mut self, track: bool) -> Self {
        self.track_scores = Some(track);
        self
    }

    /// Set scripted fields.
    pub fn script_fields(mut self, script_fields: Value) -> Self {
        self.script_fields = Some(script_fields);
        self
    }

    /// Set index boosts.
    pub fn indices_boost(mut self, boosts: Value) -> Self {
        self.indices_boost = Some(boosts);
        self
    }

    /// Set the replica preference.
    pub fn preference(mut self, preference: impl Into<String>) -> Self {
        self.preference = Some(preference.into());
        self
    }

    /// Set the routing value.
    pub fn routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }

    /// Open a scroll.
    pub fn scroll(mut self, keep_alive: impl Into<String>) -> Self {
        self.scroll = Some(keep_alive.into());
        self
    }

    /// Continue a scroll.
    pub fn scroll_id(mut self, scroll_id: impl Into<String>) -> Self {
        self.scroll_id = Some(scroll_id.into());
        self
    }

    /// Set the search type.
    pub fn search_type(mut self, search_type: impl Into<String>) -> Self {
        self.search_type = Some(search_type.into());
        self
    }

    /// Set the server-side timeout.
    pub fn timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Set unavailable-index handling.
    pub fn ignore_indices(mut self, ignore: impl Into<String>) -> Self {
        self.ignore_indices = Some(ignore.into());
        self
    }

    /// Add a body key.
    pub fn extra(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// The options as a loosely typed map, keyed by wire names.
    pub(crate) fn to_bag(&self) -> Map<String, Value> {
        let mut bag = Map::new();
        insert_some(&mut bag, "query", self.query.as_ref().map(Query::to_value));
        if !self.index.is_empty() {
            bag.insert("index".to_string(), json!(self.index.as_slice()));
        }
        if !self.doc_type.is_empty() {
            bag.insert("type".to_string(), json!(self.doc_type.as_slice()));
        }
        if !self.fields.is_empty() {
            bag.insert("fields".to_string(), json!(self.fields));
        }
        insert_some(&mut bag, "from", self.from);
        insert_some(&mut bag, "size", self.size);
        insert_some(&mut bag, "sort", self.sort.clone());
        insert_some(&mut bag, "filter", self.filter.clone());
        insert_some(&mut bag, "facets", self.facets.clone());
        insert_some(&mut bag, "highlight", self.highlight.clone());
        insert_some(&mut bag, "explain", self.explain);
        insert_some(&mut bag, "version", self.version);
        insert_some(&mut bag, "min_score", self.min_score);
        insert_some(&mut bag, "track_scores", self.track_scores);
        insert_some(&mut bag, "script_fields", self.script_fields.clone());
        insert_some(&mut bag, "indices_boost", self.indices_boost.clone());
        insert_some(&mut bag, "preference", self.preference.clone());
        insert_some(&mut bag, "routing", self.routing.clone());
        insert_some(&mut bag, "scroll", self.scroll.clone());
        insert_some(&mut bag, "scroll_id", self.scroll_id.clone());
        insert_some(&mut bag, "search_type", self.search_type.clone());
        insert_some(&mut bag, "timeout", self.timeout.clone());
        insert_some(&mut bag, "ignore_indices", self.ignore_indices.clone());
        shape::merge(&[&bag, &self.extra])
    }
}

/// Comma-joined, encoded segment for an index or type value that may be a
/// single name or a list.
fn names_segment(value: &Value) -> String {
    let names: Vec<String> = match value {
        Value::Array(_) | Value::Object(_) => shape::values(value)
            .iter()
            .filter_map(shape::query_value)
            .collect(),
        other => shape::query_value(other).into_iter().collect(),
    };
    Names::from(names).segment()
}

/// Shape a search option map into a path (with query string) and an
/// optional body.
pub(crate) fn shape_search(mut bag: Map<String, Value>) -> (String, Option<Value>) {
    let mut query = QueryParams::new();
    for name in QUERY_STRING_OPTIONS {
        if let Some(value) = take(&mut bag, name) {
            query.push_value(name, &value);
        }
    }
    let scrolling = query.get("scroll_id").is_some();

    if let Some(fields) = bag.get_mut("fields")
        && !fields.is_array()
    {
        *fields = Value::Array(vec![fields.take()]);
    }

    let mut path = String::new();
    if let Some(index) = take(&mut bag, "index") {
        path.push('/');
        path.push_str(&names_segment(&index));
    }

    let text_query = bag.get("query").and_then(Value::as_str).map(str::to_string);
    if let Some(text) = text_query {
        bag.insert(
            "query".to_string(),
            json!({ "query_string": { "query": text } }),
        );
    }

    if let Some(doc_type) = take(&mut bag, "type") {
        if path.is_empty() {
            path.push_str("/_all");
        }
        path.push('/');
        path.push_str(&names_segment(&doc_type));
    }

    path.push_str("/_search");
    if scrolling {
        path.push_str("/scroll");
    }

    let body = (!bag.is_empty()).then_some(Value::Object(bag));
    (query.append_to(path), body)
}

/// Hits from a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    /// The response's `hits` object.
    pub hits: Value,
    /// Full response body.
    pub response: Payload,
}

impl SearchResults {
    /// Total hit count, in either the plain or `{value}` form.
    pub fn total(&self) -> Option<u64> {
        let total = self.hits.get("total")?;
        total
            .as_u64()
            .or_else(|| total.get("value").and_then(Value::as_u64))
    }

    /// The `_source` of each hit, in order.
    pub fn sources(&self) -> Vec<&Value> {
        self.hits
            .get("hits")
            .and_then(Value::as_array)
            .map(|hits| hits.iter().filter_map(|hit| hit.get("_source")).collect())
            .unwrap_or_default()
    }

    /// Scroll cursor for the next page, when scrolling.
    pub fn scroll_id(&self) -> Option<&str> {
        self.response.get("_scroll_id").and_then(Value::as_str)
    }
}

/// Options for [`Client::count`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountOptions {
    /// Indices to count in. Defaults to all.
    pub index: Names,
    /// Types to count in. Defaults to all.
    pub doc_type: Names,
    /// The query. Defaults to `match_all`.
    pub query: Option<Value>,
    /// Extra query parameters, passed through unchanged.
    pub params: Map<String, Value>,
}

impl CountOptions {
    /// Default options: every document in every index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to indices.
    pub fn index(mut self, index: impl Into<Names>) -> Self {
        self.index = index.into();
        self
    }

    /// Restrict to types.
    pub fn doc_type(mut self, doc_type: impl Into<Names>) -> Self {
        self.doc_type = doc_type.into();
        self
    }

    /// Set the query.
    pub fn query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    /// Add a pass-through query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// Result of a count.
#[derive(Debug, Clone, PartialEq)]
pub struct CountResult {
    /// Matching documents.
    pub count: u64,
    /// Full response body.
    pub response: Payload,
}

impl Client {
    /// Search for documents.
    ///
    /// Routing options travel in the query string; everything else goes in
    /// the body. Without body options the request is a bodiless GET.
    pub async fn search(&self, options: SearchOptions) -> Result<SearchResults> {
        self.search_bag(options.to_bag()).await
    }

    pub(crate) async fn search_bag(&self, bag: Map<String, Value>) -> Result<SearchResults> {
        let (path, body) = shape_search(bag);
        let method = match body {
            Some(_) => Method::POST,
            None => Method::GET,
        };
        let response = self
            .request(&path, RequestOptions::new(method).json_opt(body))
            .await?;
        let hits = response.get("hits").cloned().unwrap_or(Value::Null);
        Ok(SearchResults { hits, response })
    }

    /// Count matching documents.
    ///
    /// Shard failures reported in a successful response surface as
    /// [`ElasticalError::PartialFailure`](crate::ElasticalError::PartialFailure).
    pub async fn count(&self, options: CountOptions) -> Result<CountResult> {
        let mut path = String::new();
        if !options.index.is_empty() || !options.doc_type.is_empty() {
            path.push('/');
            path.push_str(&options.index.segment_or("_all"));
        }
        if !options.doc_type.is_empty() {
            path.push('/');
            path.push_str(&options.doc_type.segment());
        }
        path.push_str("/_count");

        let mut query = QueryParams::new();
        query.extend_map(&options.params);

        let match_all = json!({ "match_all": {} });
        let request = match options.query {
            Some(q) if q != match_all => RequestOptions::post().json(json!({ "query": q })),
            _ => RequestOptions::get(),
        };

        let response = self.request(&query.append_to(path), request).await?;
        let response = check_shards(response)?;
        let count = response
            .get("count")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Ok(CountResult { count, response })
    }
}
