//! Router-level tests for the record endpoints.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::DateTime;
use record_service::config::{NameSource, ServiceConfig};
use record_service::http::{JSON_UTF8, X_REQUEST_ID};
use record_service::names::CHARACTERS;
use serde_json::json;

mod common;

use common::{get, memory_router, send, server_with, FailingStore, MemoryStore, SlowStore};

#[tokio::test]
async fn test_health_reports_path() {
    let router = memory_router();
    let res = get(&router, "/health").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers[header::CONTENT_TYPE], JSON_UTF8);
    assert_eq!(res.json, json!({"path": "/health"}));
}

#[tokio::test]
async fn test_health_ignores_store_failure() {
    let router = server_with(&ServiceConfig::default(), Arc::new(FailingStore)).router();
    let res = get(&router, "/health").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["path"], "/health");
}

#[tokio::test]
async fn test_add_list_clean_scenario() {
    let router = memory_router();

    let mut added = Vec::new();
    for _ in 0..3 {
        let res = get(&router, "/backend/record/add").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.headers[header::CONTENT_TYPE], JSON_UTF8);
        assert_eq!(res.json["path"], "/backend/record/add");
        assert_eq!(res.json["method"], "add");
        added.push(res.json["value"]["name"].as_str().unwrap().to_string());
    }

    let res = get(&router, "/backend/records").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["path"], "/backend/records");
    assert_eq!(res.json["count"], 3);
    let names: Vec<String> = res.json["names"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n.as_str().unwrap().to_string())
        .collect();
    added.reverse();
    assert_eq!(names, added, "listing must be most recent first");

    let res = get(&router, "/backend/records/clean").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.json,
        json!({"path": "/backend/records/clean", "method": "clean", "value": {"removed": 3}})
    );

    let res = get(&router, "/backend/records").await;
    assert_eq!(res.json["count"], 0);
    assert_eq!(res.json["names"], json!([]));
}

#[tokio::test]
async fn test_add_is_not_idempotent() {
    let router = memory_router();

    let first = get(&router, "/backend/record/add").await;
    let second = get(&router, "/backend/record/add").await;

    let first_id = first.json["value"]["id"].as_i64().unwrap();
    let second_id = second.json["value"]["id"].as_i64().unwrap();
    assert!(second_id > first_id);

    // Names may coincide; only the row count is asserted.
    let res = get(&router, "/backend/records").await;
    assert_eq!(res.json["count"], 2);
}

#[tokio::test]
async fn test_ids_keep_increasing_after_clean() {
    let router = memory_router();

    let before = get(&router, "/backend/record/add").await.json["value"]["id"]
        .as_i64()
        .unwrap();
    get(&router, "/backend/records/clean").await;
    let after = get(&router, "/backend/record/add").await.json["value"]["id"]
        .as_i64()
        .unwrap();

    assert!(after > before);
}

#[tokio::test]
async fn test_generated_names_come_from_dictionary() {
    let router = memory_router();
    let dictionary: HashSet<&str> = CHARACTERS.iter().copied().collect();

    for _ in 0..25 {
        let res = get(&router, "/backend/record/add").await;
        let name = res.json["value"]["name"].as_str().unwrap().to_string();
        assert!(dictionary.contains(name.as_str()), "{name} not in dictionary");
    }
}

#[tokio::test]
async fn test_timestamp_names() {
    let config = common::config_with_names(NameSource::Timestamp);
    let router = server_with(&config, Arc::new(MemoryStore::default())).router();

    let res = get(&router, "/backend/record/add").await;
    let name = res.json["value"]["name"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(name).is_ok(), "{name} is not a timestamp");
}

#[tokio::test]
async fn test_clean_on_empty_table() {
    let router = memory_router();
    let res = get(&router, "/backend/records/clean").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["value"]["removed"], 0);
}

#[tokio::test]
async fn test_store_failure_is_json_500() {
    let router = server_with(&ServiceConfig::default(), Arc::new(FailingStore)).router();

    for path in ["/backend/records", "/backend/record/add", "/backend/records/clean"] {
        let res = get(&router, path).await;
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        assert_eq!(res.headers[header::CONTENT_TYPE], JSON_UTF8);
        assert_eq!(res.json["path"], path);
        assert!(res.json["error"].as_str().unwrap().contains("connection refused"));
    }
}

#[tokio::test]
async fn test_stalled_store_times_out_as_json() {
    let mut config = ServiceConfig::default();
    config.timeouts.request_secs = Some(1);
    let store = SlowStore {
        delay: Duration::from_secs(3),
    };
    let router = server_with(&config, Arc::new(store)).router();

    let res = get(&router, "/backend/records").await;
    assert_eq!(res.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(res.headers[header::CONTENT_TYPE], JSON_UTF8);
    assert_eq!(
        res.json,
        json!({"path": "/backend/records", "error": "request timed out"})
    );

    // Routes that never touch the store are unaffected.
    let res = get(&router, "/health").await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_no_timeout_by_default() {
    let store = SlowStore {
        delay: Duration::from_millis(1200),
    };
    let router = server_with(&ServiceConfig::default(), Arc::new(store)).router();

    let res = get(&router, "/backend/records").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["count"], 0);
}

#[tokio::test]
async fn test_unknown_routes_are_404() {
    let router = memory_router();

    assert_eq!(get(&router, "/").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "/backend/unknown").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_is_not_routed() {
    let router = memory_router();
    let request = Request::builder()
        .method("POST")
        .uri("/backend/record/add")
        .body(Body::empty())
        .unwrap();

    let res = send(&router, request).await;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_backend_echo_route() {
    let mut config = ServiceConfig::default();
    config.records.backend_echo = true;
    let router = server_with(&config, Arc::new(MemoryStore::default())).router();

    let res = get(&router, "/backend/anything/at/all").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json, json!({"path": "/backend/*"}));

    // Concrete routes still win over the wildcard.
    let res = get(&router, "/backend/records").await;
    assert_eq!(res.json["path"], "/backend/records");
}

#[tokio::test]
async fn test_request_id_is_assigned_and_kept() {
    let router = memory_router();

    let res = get(&router, "/health").await;
    assert!(res.headers.contains_key(X_REQUEST_ID));

    let request = Request::builder()
        .uri("/health")
        .header(X_REQUEST_ID, "lb-trace-42")
        .body(Body::empty())
        .unwrap();
    let res = send(&router, request).await;
    assert_eq!(res.headers[X_REQUEST_ID], "lb-trace-42");
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let router = memory_router();
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://frontend.example.com")
        .body(Body::empty())
        .unwrap();

    let res = send(&router, request).await;
    assert_eq!(res.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_cors_restricted_origin() {
    let mut config = ServiceConfig::default();
    config.cors.origin = "https://frontend.example.com".into();
    let router = server_with(&config, Arc::new(MemoryStore::default())).router();

    let request = Request::builder()
        .uri("/backend/records")
        .header(header::ORIGIN, "https://frontend.example.com")
        .body(Body::empty())
        .unwrap();
    let res = send(&router, request).await;
    assert_eq!(
        res.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://frontend.example.com"
    );
}
