//! Integration tests for the Elasticsearch client
//!
//! A wiremock server stands in for the search node, so the tests check the
//! exact REST requests the client sends.

use manual_indexer::config::SearchConfig;
use manual_indexer::search::{ensure_index, DocumentBody, DEFAULT_INDEX};
use manual_indexer::{ElasticsearchClient, IndexDocument, IndexSchema, SearchClient, SearchError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, typed: bool) -> ElasticsearchClient {
    ElasticsearchClient::from_config(&SearchConfig {
        endpoint: server.uri(),
        typed_endpoints: typed,
        ..SearchConfig::default()
    })
    .expect("Failed to build client")
}

fn document() -> IndexDocument {
    let schema = IndexSchema::default();
    IndexDocument {
        index: schema.index,
        document_type: schema.document_type,
        id: "0123abcd".to_string(),
        body: DocumentBody {
            manual: "Core APIs".to_string(),
            version: "10.4".to_string(),
            uri: "https://docs.example.org/m/Index.html#intro".to_string(),
            title: "Introduction".to_string(),
            content: "Introduction Welcome.".to_string(),
        },
    }
}

#[tokio::test]
async fn test_index_exists() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/present"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/absent"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let es = client(&server, false);
    assert!(es.index_exists("present").await.unwrap());
    assert!(!es.index_exists("absent").await.unwrap());
}

#[tokio::test]
async fn test_index_exists_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server, false).index_exists("idx").await.unwrap_err();
    assert!(matches!(err, SearchError::Rejected { status: 503, .. }));
}

#[tokio::test]
async fn test_create_index_sends_keyword_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/{}", DEFAULT_INDEX)))
        .and(body_json(json!({
            "mappings": {
                "properties": {
                    "manual": { "type": "keyword" },
                    "version": { "type": "keyword" }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, false)
        .create_index(&IndexSchema::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_index_typed_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/{}", DEFAULT_INDEX)))
        .and(body_json(json!({
            "mappings": {
                "manualentry": {
                    "properties": {
                        "manual": { "type": "keyword" },
                        "version": { "type": "keyword" }
                    }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, true)
        .create_index(&IndexSchema::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_index_tolerates_concurrent_creation() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "type": "resource_already_exists_exception",
                "reason": "index [typo3documentation/abc] already exists"
            },
            "status": 400
        })))
        .mount(&server)
        .await;

    let result = client(&server, false)
        .create_index(&IndexSchema::default())
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_index_other_rejection_fails() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(400).set_body_string("mapper_parsing_exception"))
        .mount(&server)
        .await;

    let err = client(&server, false)
        .create_index(&IndexSchema::default())
        .await
        .unwrap_err();
    assert!(
        matches!(err, SearchError::Rejected { status: 400, ref body } if body == "mapper_parsing_exception")
    );
}

#[tokio::test]
async fn test_ensure_index_skips_existing_index() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path(format!("/{}", DEFAULT_INDEX)))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let created = ensure_index(&client(&server, false), &IndexSchema::default())
        .await
        .unwrap();
    assert!(!created);
}

#[tokio::test]
async fn test_upsert_document() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/{}/_doc/0123abcd", DEFAULT_INDEX)))
        .and(body_json(json!({
            "manual": "Core APIs",
            "version": "10.4",
            "uri": "https://docs.example.org/m/Index.html#intro",
            "title": "Introduction",
            "content": "Introduction Welcome."
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, false)
        .upsert_document(&document())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_upsert_document_typed_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/{}/manualentry/0123abcd", DEFAULT_INDEX)))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, true)
        .upsert_document(&document())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_upsert_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
        .mount(&server)
        .await;

    let err = client(&server, false)
        .upsert_document(&document())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Rejected { status: 429, .. }));
}

#[tokio::test]
async fn test_delete_stale_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{}/_delete_by_query", DEFAULT_INDEX)))
        .and(query_param("refresh", "true"))
        .and(query_param("conflicts", "proceed"))
        .and(body_json(json!({
            "query": {
                "bool": {
                    "filter": [
                        { "term": { "manual": "Core APIs" } },
                        { "term": { "version": "10.4" } },
                        { "prefix": { "uri.keyword": "https://docs.example.org/m/core/10.4/en-us/" } }
                    ],
                    "must_not": [
                        { "ids": { "values": ["keep-1", "keep-2"] } }
                    ]
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 12,
            "total": 3,
            "deleted": 3,
            "failures": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let deleted = client(&server, false)
        .delete_stale(
            DEFAULT_INDEX,
            "Core APIs",
            "10.4",
            "https://docs.example.org/m/core/10.4/en-us/",
            &["keep-1".to_string(), "keep-2".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(deleted, 3);
}

#[tokio::test]
async fn test_basic_auth_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let es = ElasticsearchClient::from_config(&SearchConfig {
        endpoint: server.uri(),
        username: Some("user".to_string()),
        password: Some("pass".to_string()),
        ..SearchConfig::default()
    })
    .unwrap();

    assert!(es.index_exists(DEFAULT_INDEX).await.unwrap());
}
