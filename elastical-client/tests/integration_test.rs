//! Integration tests for elastical-client against a mock server.

use elastical_client::*;
use serde_json::json;
use wiremock::matchers::{body_json, body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    let address = server.address();
    Client::new(ConnectionConfig::new(address.ip().to_string()).with_port(address.port()))
}

#[tokio::test]
async fn test_create_index_then_store_and_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/blog/post/1"))
        .and(query_param("refresh", "1"))
        .and(body_json(json!({"title": "Hello"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true, "_id": "1", "_version": 1})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog/_all/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_index": "blog", "_type": "post", "_id": "1", "exists": true,
            "_source": {"title": "Hello"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (blog, created) = client.create_index("blog", None).await.unwrap();
    assert_eq!(created.get("acknowledged"), Some(&json!(true)));
    assert!(std::sync::Arc::ptr_eq(&blog, &client.get_index("blog")));

    let stored = blog
        .index("post", json!({"title": "Hello"}), IndexOptions::new().id("1").refresh(true))
        .await
        .unwrap();
    assert_eq!(stored.get("_id"), Some(&json!("1")));

    let fetched = blog.get("1", GetOptions::default()).await.unwrap();
    assert_eq!(fetched.document, Some(json!({"title": "Hello"})));
}

#[tokio::test]
async fn test_missing_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog/post/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "_index": "blog", "_type": "post", "_id": "nope", "exists": false
        })))
        .mount(&server)
        .await;

    let blog = client_for(&server).get_index("blog");

    let err = blog
        .get("nope", GetOptions::new().doc_type("post"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert!(err.is_not_found());

    let result = blog
        .get("nope", GetOptions::new().doc_type("post").ignore_missing(true))
        .await
        .unwrap();
    assert_eq!(result.document, None);
    assert_eq!(result.response.get("exists"), Some(&json!(false)));
}

#[tokio::test]
async fn test_exists_reflects_status() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.index_exists("blog").await);
    assert!(!client.index_exists("missing").await);
    assert!(matches!(client.probe_index("missing").await, Existence::Absent));
}

#[tokio::test]
async fn test_count_reports_shard_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/blog/_count"))
        .and(body_json(json!({"query": {"term": {"tag": "x"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3,
            "_shards": {"total": 2, "successful": 1, "failed": 1,
                "failures": [{"index": "blog", "shard": 1, "reason": "BroadcastShardOperationFailedException"}]}
        })))
        .mount(&server)
        .await;

    let blog = client_for(&server).get_index("blog");
    let err = blog
        .count(CountOptions::new().query(json!({"term": {"tag": "x"}})))
        .await
        .unwrap_err();
    match err {
        ElasticalError::PartialFailure { failed, reasons, .. } => {
            assert_eq!(failed, 1);
            assert_eq!(reasons, vec!["BroadcastShardOperationFailedException".to_string()]);
        }
        other => panic!("expected a partial failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bulk_sends_newline_delimited_body() {
    let server = MockServer::start().await;
    let expected = concat!(
        "{\"create\":{\"_index\":\"blog\",\"_type\":\"post\",\"_id\":\"foo\"}}\n",
        "{\"a\":\"a\"}\n",
        "{\"delete\":{\"_index\":\"blog\",\"_type\":\"post\",\"_id\":\"x\"}}\n",
    );
    Mock::given(method("PUT"))
        .and(path("/_bulk"))
        .and(body_string(expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"took": 2, "items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let operations = BulkOperation::from_values(&json!([
        {"create": {"index": "blog", "type": "post", "id": "foo", "data": {"a": "a"}}},
        {"delete": {"index": "blog", "type": "post", "id": "x"}}
    ]))
    .unwrap();
    let response = client_for(&server)
        .bulk(&operations, BulkOptions::default())
        .await
        .unwrap();
    assert_eq!(response.get("took"), Some(&json!(2)));
}

#[tokio::test]
async fn test_search_returns_hits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/blog/_search"))
        .and(query_param("routing", "u1"))
        .and(body_json(json!({"query": {"query_string": {"query": "pie"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 1,
            "hits": {"total": 1, "hits": [{"_id": "1", "_source": {"title": "Apple pie"}}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let blog = client_for(&server).get_index("blog");
    let results = blog
        .search(SearchOptions::new().query("pie").routing("u1"))
        .await
        .unwrap();
    assert_eq!(results.total(), Some(1));
    assert_eq!(results.sources(), vec![&json!({"title": "Apple pie"})]);
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "IndexAlreadyExistsException[[blog] Already exists]", "status": 400
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).create_index("blog", None).await.unwrap_err();
    assert_eq!(err.to_string(), "IndexAlreadyExistsException[[blog] Already exists]");
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
}
