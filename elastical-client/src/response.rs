//! Response decoding and classification.

use elastical_transport::{RawResponse, StatusCode};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{ElasticalError, Result};

/// A response body, decoded as JSON when possible.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body parsed as JSON. An empty body decodes as `{}`.
    Json(Value),
    /// Body that is not valid JSON, kept as text.
    Text(String),
}

impl Payload {
    /// Decode a body: JSON first, text as the fallback.
    pub fn decode(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        if text.trim().is_empty() {
            return Payload::Json(Value::Object(Map::new()));
        }
        match serde_json::from_str(&text) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(text.into_owned()),
        }
    }

    /// The JSON value, if the body decoded.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    /// The raw text, if the body did not decode.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Json(_) => None,
        }
    }

    /// Convert into a JSON value; text becomes a JSON string.
    pub fn into_json(self) -> Value {
        match self {
            Payload::Json(value) => value,
            Payload::Text(text) => Value::String(text),
        }
    }

    /// Top-level field of a JSON object body.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_json().and_then(|value| value.get(key))
    }

    /// Server error message: `error` as a string, or `error.reason`.
    pub fn error_message(&self) -> Option<String> {
        match self.get("error")? {
            Value::String(message) => Some(message.clone()),
            Value::Object(error) => error
                .get("reason")
                .and_then(Value::as_str)
                .or_else(|| error.get("type").and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        }
    }

    /// Whether the body describes a missing index, type or document.
    pub fn is_not_found(&self) -> bool {
        if self.get("exists") == Some(&Value::Bool(false))
            || self.get("found") == Some(&Value::Bool(false))
        {
            return true;
        }

        let error_type = self
            .get("error")
            .and_then(|error| error.get("type"))
            .and_then(Value::as_str);
        if error_type.is_some_and(|t| t == "index_not_found_exception") {
            return true;
        }

        self.error_message()
            .is_some_and(|m| m.contains("IndexMissing") || m.contains("index_not_found"))
    }
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Json(Value::Object(Map::new()))
    }
}

/// Split a raw response into success or [`ElasticalError::Http`].
pub(crate) fn classify(raw: RawResponse) -> Result<Payload> {
    let status = raw.status();
    trace!(status = %status, bytes = raw.bytes().len(), "Decoding response body");
    let payload = Payload::decode(raw.bytes());

    if status.is_success() {
        return Ok(payload);
    }

    Err(http_error(status, payload))
}

pub(crate) fn http_error(status: StatusCode, body: Payload) -> ElasticalError {
    let message = body
        .error_message()
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    ElasticalError::Http {
        status,
        message,
        body,
    }
}

/// Surface `_shards.failed > 0` on an otherwise successful response.
pub(crate) fn check_shards(payload: Payload) -> Result<Payload> {
    let shards = payload.get("_shards");
    let failed = shards
        .and_then(|s| s.get("failed"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    if failed == 0 {
        return Ok(payload);
    }

    let reasons = shards
        .and_then(|s| s.get("failures"))
        .and_then(Value::as_array)
        .map(|failures| {
            failures
                .iter()
                .filter_map(|f| match f.get("reason")? {
                    Value::String(reason) => Some(reason.clone()),
                    Value::Object(reason) => reason
                        .get("reason")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    Err(ElasticalError::PartialFailure {
        failed,
        reasons,
        body: payload,
    })
}
