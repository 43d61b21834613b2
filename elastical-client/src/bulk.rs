//! Bulk operations.

use serde_json::{Map, Value};

use crate::{
    client::Client,
    error::{ElasticalError, Result},
    request::{QueryParams, RequestOptions},
    response::Payload,
    shape::{self, insert_some, take},
};

/// Metadata keys that go on the wire without an underscore prefix.
const UNPREFIXED: [&str; 1] = ["percolate"];

/// Bulk action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    /// Create a document, failing if it exists.
    Create,
    /// Create or replace a document.
    Index,
    /// Delete a document.
    Delete,
}

impl BulkAction {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Create => "create",
            BulkAction::Index => "index",
            BulkAction::Delete => "delete",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "create" => Some(BulkAction::Create),
            "index" => Some(BulkAction::Index),
            "delete" => Some(BulkAction::Delete),
            _ => None,
        }
    }

    /// Whether the action is followed by a document line.
    pub fn carries_data(&self) -> bool {
        matches!(self, BulkAction::Create | BulkAction::Index)
    }
}

/// One action in a bulk request.
///
/// Metadata is kept under plain names (`index`, `type`, `id`, `version`, ...)
/// and prefixed with `_` when written.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOperation {
    action: BulkAction,
    meta: Map<String, Value>,
    data: Option<Value>,
}

impl BulkOperation {
    fn new(action: BulkAction, index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        let mut meta = Map::new();
        meta.insert("index".to_string(), Value::String(index.into()));
        meta.insert("type".to_string(), Value::String(doc_type.into()));
        Self {
            action,
            meta,
            data: None,
        }
    }

    /// Create a document.
    pub fn create(index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self::new(BulkAction::Create, index, doc_type)
    }

    /// Create or replace a document.
    pub fn index(index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self::new(BulkAction::Index, index, doc_type)
    }

    /// Delete the document with this id.
    pub fn delete(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self::new(BulkAction::Delete, index, doc_type).id(id)
    }

    /// Set the document id.
    pub fn id(self, id: impl Into<String>) -> Self {
        self.field("id", id.into())
    }

    /// Set the document body.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set another metadata field, such as `version`, `routing` or
    /// `percolate`.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(name.into(), value.into());
        self
    }

    /// The action type.
    pub fn action(&self) -> BulkAction {
        self.action
    }

    /// Parse the `{"<action>": {"index": ..., "type": ..., "id": ...,
    /// "data": {...}}}` form.
    pub fn from_value(value: &Value) -> Result<Self> {
        let entry = match value.as_object() {
            Some(entry) if entry.len() == 1 => entry,
            _ => {
                return Err(ElasticalError::Validation(
                    "bulk operation must be an object with a single action key".to_string(),
                ));
            }
        };

        let (name, body) = entry
            .iter()
            .next()
            .ok_or_else(|| ElasticalError::Validation("empty bulk operation".to_string()))?;
        let action = BulkAction::from_name(name).ok_or_else(|| {
            ElasticalError::Validation(format!("unknown bulk action: {name}"))
        })?;
        let mut meta = body.as_object().cloned().ok_or_else(|| {
            ElasticalError::Validation(format!("bulk {name} metadata must be an object"))
        })?;
        let data = take(&mut meta, "data");

        Ok(Self { action, meta, data })
    }

    /// Parse a list (or map) of operations in the loose form.
    pub fn from_values(value: &Value) -> Result<Vec<Self>> {
        shape::values(value).iter().map(Self::from_value).collect()
    }

    fn write_lines(&self, out: &mut String) -> Result<()> {
        let mut wire = Map::new();
        for (key, value) in &self.meta {
            let key = if key.starts_with('_') || UNPREFIXED.contains(&key.as_str()) {
                key.clone()
            } else {
                format!("_{key}")
            };
            wire.insert(key, value.clone());
        }

        let mut line = Map::new();
        line.insert(self.action.as_str().to_string(), Value::Object(wire));
        out.push_str(&serde_json::to_string(&line)?);
        out.push('\n');

        if self.action.carries_data() {
            let data = self
                .data
                .clone()
                .unwrap_or_else(|| Value::Object(Map::new()));
            out.push_str(&serde_json::to_string(&data)?);
            out.push('\n');
        }
        Ok(())
    }
}

/// Newline-delimited bulk body: one metadata line per operation, followed
/// by a document line for create and index, with a trailing newline.
pub fn bulk_body(operations: &[BulkOperation]) -> Result<String> {
    let mut body = String::new();
    for operation in operations {
        operation.write_lines(&mut body)?;
    }
    Ok(body)
}

/// Options for [`Client::bulk`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkOptions {
    /// Default index, giving `/{index}/_bulk`.
    pub index: Option<String>,
    /// Write consistency.
    pub consistency: Option<String>,
    /// Refresh affected shards afterwards.
    pub refresh: Option<bool>,
    /// Extra query parameters, passed through unchanged.
    pub params: Map<String, Value>,
}

impl BulkOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default index.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Set write consistency.
    pub fn consistency(mut self, consistency: impl Into<String>) -> Self {
        self.consistency = Some(consistency.into());
        self
    }

    /// Refresh afterwards.
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// Add a pass-through query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

impl Client {
    /// Send several index, create and delete actions in one request.
    pub async fn bulk(&self, operations: &[BulkOperation], options: BulkOptions) -> Result<Payload> {
        let body = bulk_body(operations)?;

        let mut path = String::new();
        if let Some(index) = &options.index {
            path.push('/');
            path.push_str(&shape::encode(index));
        }
        path.push_str("/_bulk");

        let mut bag = Map::new();
        insert_some(&mut bag, "consistency", options.consistency.clone());
        insert_some(&mut bag, "refresh", options.refresh);
        let mut query = QueryParams::new();
        query.extend_map(&shape::merge(&[&bag, &options.params]));

        self.request(&query.append_to(path), RequestOptions::put().raw(body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{captured, hooked_client};
    use elastical_transport::{Body, Method};
    use serde_json::json;

    #[test]
    fn test_body_pairs_metadata_and_data() {
        let operations = [
            BulkOperation::create("blog", "post")
                .id("foo")
                .data(json!({"a": "a"})),
            BulkOperation::delete("blog", "post", "x"),
        ];
        assert_eq!(
            bulk_body(&operations).unwrap(),
            concat!(
                r#"{"create":{"_index":"blog","_type":"post","_id":"foo"}}"#,
                "\n",
                r#"{"a":"a"}"#,
                "\n",
                r#"{"delete":{"_index":"blog","_type":"post","_id":"x"}}"#,
                "\n",
            )
        );
    }

    #[test]
    fn test_percolate_is_not_prefixed() {
        let operation = BulkOperation::index("blog", "post")
            .id("baz")
            .field("percolate", "*")
            .field("version", 3)
            .data(json!({"e": "bulkpercolate"}));
        assert_eq!(
            bulk_body(&[operation]).unwrap(),
            concat!(
                r#"{"index":{"_index":"blog","_type":"post","_id":"baz","percolate":"*","_version":3}}"#,
                "\n",
                r#"{"e":"bulkpercolate"}"#,
                "\n",
            )
        );
    }

    #[test]
    fn test_parse_loose_form() {
        let operations = BulkOperation::from_values(&json!([
            {"create": {"index": "blog", "type": "post", "id": "foo", "data": {"a": "a"}}},
            {"delete": {"index": "blog", "type": "post", "id": "x"}}
        ]))
        .unwrap();

        assert_eq!(operations.len(), 2);
        assert_eq!(operations[0].action(), BulkAction::Create);
        assert_eq!(
            operations[0],
            BulkOperation::create("blog", "post").id("foo").data(json!({"a": "a"}))
        );
        assert_eq!(operations[1], BulkOperation::delete("blog", "post", "x"));
    }

    #[test]
    fn test_parse_rejects_unknown_action() {
        let err = BulkOperation::from_value(&json!({"upsert": {"index": "blog"}})).unwrap_err();
        assert!(matches!(err, ElasticalError::Validation(_)));

        let err = BulkOperation::from_value(&json!({"create": {}, "delete": {}})).unwrap_err();
        assert!(matches!(err, ElasticalError::Validation(_)));
    }

    #[test]
    fn test_create_without_data_writes_empty_document() {
        let body = bulk_body(&[BulkOperation::create("blog", "post")]).unwrap();
        assert_eq!(body, "{\"create\":{\"_index\":\"blog\",\"_type\":\"post\"}}\n{}\n");
    }

    #[tokio::test]
    async fn test_bulk_request() {
        let client = hooked_client();
        let operations = [BulkOperation::delete("blog", "post", "x")];
        let request = captured(client.bulk(&operations, BulkOptions::default()).await);
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.path(), "/_bulk");
        assert_eq!(
            request.body,
            Some(Body::Raw("{\"delete\":{\"_index\":\"blog\",\"_type\":\"post\",\"_id\":\"x\"}}\n".to_string()))
        );

        let options = BulkOptions::new().index("blog").refresh(true);
        let request = captured(client.bulk(&operations, options).await);
        assert_eq!(request.path(), "/blog/_bulk");
        assert_eq!(request.url.query(), Some("refresh=1"));
    }
}
