//! Request descriptor pieces: name lists, query parameters and per-call
//! options for the request primitive.

use elastical_transport::{Body, Method, TransportOptions};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::shape::{self, Key};

/// One or more index or type names.
///
/// Renders as a single comma-joined, percent-encoded path segment. An empty
/// list stands for "all" and each operation documents the segment it falls
/// back to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Names(Vec<String>);

impl Names {
    /// The empty list.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Comma-joined names, unencoded.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }

    /// Encoded path segment; empty when there are no names.
    pub fn segment(&self) -> String {
        shape::encode(&self.joined())
    }

    /// Encoded path segment, or `default` when there are no names.
    pub fn segment_or(&self, default: &str) -> String {
        if self.is_empty() {
            default.to_string()
        } else {
            self.segment()
        }
    }
}

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Names(vec![name.to_string()])
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Names(vec![name])
    }
}

impl From<&String> for Names {
    fn from(name: &String) -> Self {
        Names(vec![name.clone()])
    }
}

impl<T: Into<String>> From<Vec<T>> for Names {
    fn from(names: Vec<T>) -> Self {
        Names(names.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<String>, const N: usize> From<[T; N]> for Names {
    fn from(names: [T; N]) -> Self {
        Names(names.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<String> + Clone> From<&[T]> for Names {
    fn from(names: &[T]) -> Self {
        Names(names.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Names>> From<Option<T>> for Names {
    fn from(names: Option<T>) -> Self {
        names.map(Into::into).unwrap_or_default()
    }
}

/// Ordered query-string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Append a boolean parameter as `1`/`0`.
    pub fn push_flag(&mut self, name: impl Into<String>, value: bool) {
        self.push(name, shape::flag(value));
    }

    /// Append a JSON value; `null` is skipped.
    pub fn push_value(&mut self, name: impl Into<String>, value: &Value) {
        if let Some(rendered) = shape::query_value(value) {
            self.push(name, rendered);
        }
    }

    /// Append every entry of an option map, in order.
    pub fn extend_map(&mut self, map: &Map<String, Value>) {
        self.extend_value(&Value::Object(map.clone()));
    }

    /// Append every entry of a map-shaped value; sequences contribute their
    /// offsets as names.
    pub fn extend_value(&mut self, value: &Value) {
        shape::each(value, |item, key| match key {
            Key::Name(name) => self.push_value(name, item),
            Key::Index(i) => self.push_value(i.to_string(), item),
        });
    }

    /// Value of the first parameter with this name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Encoded `name=value&...` form.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(n, v)| format!("{}={}", shape::encode(n), shape::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `path` with the query string appended, if there is one.
    pub fn append_to(&self, mut path: String) -> String {
        if !self.is_empty() {
            path.push('?');
            path.push_str(&self.to_query_string());
        }
        path
    }
}

/// Per-call options for [`Client::request`](crate::Client::request).
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// HTTP method.
    pub method: Method,
    /// Request body.
    pub body: Option<Body>,
    /// Transport options; set fields win over the connection defaults.
    pub transport: TransportOptions,
}

impl RequestOptions {
    /// Options for a bodiless request with the given method. `get`, `put`,
    /// `post`, `delete` and `head` are shorthands.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            transport: TransportOptions::default(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn head() -> Self {
        Self::new(Method::HEAD)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(Body::Json(body));
        self
    }

    /// Attach a JSON body if one is given.
    pub fn json_opt(mut self, body: Option<Value>) -> Self {
        self.body = body.map(Body::Json);
        self
    }

    /// Attach a raw text body.
    pub fn raw(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Body::Raw(body.into()));
        self
    }

    /// Override the timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = Some(timeout);
        self
    }

    /// Per-call transport options.
    pub fn transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names_segment_is_encoded_and_stable() {
        let names = Names::from(["foo", "bar"]);
        assert_eq!(names.segment(), "foo%2Cbar");
        assert_eq!(names.segment(), "foo%2Cbar");
        assert_eq!(names.joined(), "foo,bar");
    }

    #[test]
    fn test_names_default_segment() {
        assert_eq!(Names::all().segment_or("_all"), "_all");
        assert_eq!(Names::all().segment(), "");
        assert_eq!(Names::from("blog").segment_or("_all"), "blog");
        assert_eq!(Names::from(None::<&str>), Names::all());
        assert_eq!(Names::from(vec!["a".to_string()]).as_slice(), ["a".to_string()]);
    }

    #[test]
    fn test_query_params_render_flags_as_digits() {
        let mut query = QueryParams::new();
        query.push_flag("refresh", true);
        query.push_value("realtime", &json!(false));
        query.push_value("routing", &Value::Null);
        query.push_value("fields", &json!(["title", "tags"]));

        assert_eq!(query.get("refresh"), Some("1"));
        assert_eq!(query.get("realtime"), Some("0"));
        assert_eq!(query.get("routing"), None);
        assert_eq!(query.to_query_string(), "refresh=1&realtime=0&fields=title%2Ctags");
    }

    #[test]
    fn test_query_params_extend_keeps_order() {
        let mut query = QueryParams::new();
        query.extend_value(&json!({"b": "x y", "a": 1}));
        assert_eq!(query.append_to("/blog".to_string()), "/blog?b=x%20y&a=1");
        assert_eq!(QueryParams::new().append_to("/blog".to_string()), "/blog");
    }

    #[test]
    fn test_request_options_builders() {
        let options = RequestOptions::put()
            .json(json!({"a": 1}))
            .timeout(Duration::from_secs(1));
        assert_eq!(options.method, Method::PUT);
        assert_eq!(options.body, Some(Body::Json(json!({"a": 1}))));
        assert_eq!(options.transport.timeout, Some(Duration::from_secs(1)));

        assert_eq!(RequestOptions::post().json_opt(None).body, None);
        assert_eq!(RequestOptions::default().method, Method::GET);
    }
}
