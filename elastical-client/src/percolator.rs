//! Percolator queries: register queries, then match documents against them.

use serde_json::{Map, Value};

use crate::{
    client::Client,
    document::GetResult,
    error::Result,
    request::RequestOptions,
    response::Payload,
    shape,
};

/// Result of [`Client::percolate`].
#[derive(Debug, Clone, PartialEq)]
pub struct PercolateResult {
    /// Names of the registered queries that matched.
    pub matches: Vec<String>,
    /// Full response body.
    pub response: Payload,
}

impl PercolateResult {
    fn from_response(response: Payload) -> Self {
        let matches = response
            .get("matches")
            .and_then(Value::as_array)
            .map(|matches| matches.iter().filter_map(match_name).collect())
            .unwrap_or_default();
        Self { matches, response }
    }
}

// Older servers list names, newer ones list `{"_index", "_id"}` objects.
fn match_name(entry: &Value) -> Option<String> {
    match entry {
        Value::String(name) => Some(name.clone()),
        Value::Object(object) => object.get("_id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn query_path(index: &str, name: &str) -> String {
    format!("/_percolator/{}/{}", shape::encode(index), shape::encode(name))
}

impl Client {
    /// Register a percolator query under `name` for `index`.
    pub async fn set_percolator(&self, index: &str, name: &str, query: Value) -> Result<Payload> {
        self.request(&query_path(index, name), RequestOptions::post().json(query))
            .await
    }

    /// Fetch a registered percolator query.
    pub async fn get_percolator(&self, index: &str, name: &str) -> Result<GetResult> {
        let response = self
            .request(&query_path(index, name), RequestOptions::get())
            .await?;
        Ok(GetResult::from_response(response))
    }

    /// Remove a registered percolator query.
    pub async fn delete_percolator(&self, index: &str, name: &str) -> Result<Payload> {
        self.request(&query_path(index, name), RequestOptions::delete())
            .await
    }

    /// Match a document against the queries registered for `index`.
    ///
    /// The document is wrapped as `{"doc": ...}` unless it already has a
    /// `doc` key.
    pub async fn percolate(
        &self,
        index: &str,
        doc_type: &str,
        document: Value,
    ) -> Result<PercolateResult> {
        let body = if document.get("doc").is_some() {
            document
        } else {
            let mut wrapped = Map::new();
            wrapped.insert("doc".to_string(), document);
            Value::Object(wrapped)
        };
        let path = format!(
            "/{}/{}/_percolate",
            shape::encode(index),
            shape::encode(doc_type)
        );
        let response = self
            .request(&path, RequestOptions::get().json(body))
            .await?;
        Ok(PercolateResult::from_response(response))
    }
}
