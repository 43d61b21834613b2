//! Request descriptor handed to a transport.

use crate::TransportOptions;
use http::Method;
use serde_json::Value;
use url::Url;

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// JSON document, serialized by the transport.
    Json(Value),
    /// Pre-rendered text sent as-is (newline-delimited JSON for bulk).
    Raw(String),
}

impl Body {
    /// Content type announced for this body.
    pub fn content_type(&self) -> &'static str {
        match self {
            Body::Json(_) => "application/json",
            Body::Raw(_) => "text/plain; charset=utf-8",
        }
    }

    /// Render the body to the bytes put on the wire.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Body::Json(value) => serde_json::to_vec(value),
            Body::Raw(text) => Ok(text.clone().into_bytes()),
        }
    }

    /// The JSON document, if this is a JSON body.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Raw(_) => None,
        }
    }

    /// The raw text, if this is a raw body.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Body::Json(_) => None,
            Body::Raw(text) => Some(text),
        }
    }
}

/// A fully assembled request: everything a transport needs to dispatch it.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, query string included.
    pub url: Url,
    /// Optional body.
    pub body: Option<Body>,
    /// Effective transport options for this request.
    pub options: TransportOptions,
}

impl TransportRequest {
    /// Create a request without body or options.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            options: TransportOptions::default(),
        }
    }

    /// Attach a body.
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach transport options.
    pub fn with_options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }

    /// URL path, percent-encoded as sent.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Decoded query pairs, in wire order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Decoded value of a single query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_helpers() {
        let url = Url::parse("http://127.0.0.1:9200/blog/post/1?refresh=1&fields=a%2Cb").unwrap();
        let request = TransportRequest::new(Method::GET, url);

        assert_eq!(request.path(), "/blog/post/1");
        assert_eq!(request.query_param("fields").as_deref(), Some("a,b"));
        assert_eq!(request.query_pairs().len(), 2);
        assert!(request.body.is_none());
    }

    #[test]
    fn test_body_rendering() {
        let json_body = Body::Json(json!({"title": "x"}));
        assert_eq!(json_body.to_bytes().unwrap(), br#"{"title":"x"}"#.to_vec());
        assert_eq!(json_body.content_type(), "application/json");

        let raw = Body::Raw("line\n".to_string());
        assert_eq!(raw.as_raw(), Some("line\n"));
        assert!(raw.as_json().is_none());
    }
}
