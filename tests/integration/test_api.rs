//! Tests for the REST API surface.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use granary::{create_rest_router, GrantService, MemoryGrantStore, RestApiConfig, Taxonomy};

/// Build a router over a fresh in-memory service with no remote model.
fn test_router() -> Router {
    let service = Arc::new(GrantService::with_parts(
        Arc::new(Taxonomy::builtin()),
        None,
        Arc::new(MemoryGrantStore::new()),
        16 * 1024,
        4,
    ));
    create_rest_router(service, &RestApiConfig::default())
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_json(router: &Router, uri: &str, payload: &Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = test_router();
    let (status, body) = get(&router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_tags_endpoint_lists_taxonomy() {
    let router = test_router();
    let (status, body) = get(&router, "/api/tags").await;
    assert_eq!(status, StatusCode::OK);

    let tags = body["tags"].as_array().unwrap();
    assert!(tags.iter().any(|t| t == "agriculture"));
    assert!(tags.iter().any(|t| t == "flood"));

    // The synonym listing reports the symmetric view of the relation.
    let water = body["synonyms"]["water"].as_array().unwrap();
    assert!(water.iter().any(|t| t == "irrigation"));
    let irrigation = body["synonyms"]["irrigation"].as_array().unwrap();
    assert!(irrigation.iter().any(|t| t == "water"));
}

#[tokio::test]
async fn test_ingest_accepts_single_object() {
    let router = test_router();
    let payload = json!({
        "grant_name": "Drip retrofit",
        "grant_description": "drip irrigation retrofit"
    });

    let (status, body) = post_json(&router, "/api/grants", &payload).await;
    assert_eq!(status, StatusCode::CREATED);

    let grants = body["grants"].as_array().unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0]["grant_name"], "Drip retrofit");
    assert_eq!(grants[0]["provenance"], "heuristic");
    let tags = grants[0]["tags"].as_array().unwrap();
    assert!(tags.iter().any(|t| t == "irrigation"));
}

#[tokio::test]
async fn test_ingest_batch_reports_per_item_failures() {
    let router = test_router();
    let payload = json!([
        {"grant_name": "First", "grant_description": "irrigation upgrade"},
        {"grant_name": "", "grant_description": "missing its name"},
        {"grant_name": "Third", "grant_description": "dairy equipment"}
    ]);

    let (status, body) = post_json(&router, "/api/grants", &payload).await;
    assert_eq!(status, StatusCode::CREATED);

    let grants = body["grants"].as_array().unwrap();
    assert_eq!(grants.len(), 2);
    assert_eq!(grants[0]["grant_name"], "First");
    assert_eq!(grants[1]["grant_name"], "Third");

    let failures = body["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["index"], 1);
}

#[tokio::test]
async fn test_ingest_rejects_fully_invalid_batch() {
    let router = test_router();
    let payload = json!([{"grant_name": " ", "grant_description": ""}]);

    let (status, body) = post_json(&router, "/api/grants", &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["grants"].as_array().unwrap().is_empty());
    assert_eq!(body["failures"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ingest_rejects_empty_array() {
    let router = test_router();
    let (status, body) = post_json(&router, "/api/grants", &json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "empty_payload");
}

#[tokio::test]
async fn test_effective_tags_preview() {
    let router = test_router();
    let (status, body) = get(&router, "/api/tags/effective?tags=water&synonyms=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"], json!(["irrigation", "water"]));

    // The flag defaults to off: canonicalization only.
    let (_, unexpanded) = get(&router, "/api/tags/effective?tags=water").await;
    assert_eq!(unexpanded["tags"], json!(["water"]));
}

#[tokio::test]
async fn test_list_grants_filters_with_synonyms() {
    let router = test_router();
    post_json(
        &router,
        "/api/grants",
        &json!({
            "grant_name": "Drip retrofit",
            "grant_description": "drip irrigation retrofit"
        }),
    )
    .await;
    post_json(
        &router,
        "/api/grants",
        &json!({
            "grant_name": "Dairy fund",
            "grant_description": "dairy herd expansion"
        }),
    )
    .await;

    let (status, body) = get(&router, "/api/grants?tags=water&synonyms=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["grants"][0]["grant_name"], "Drip retrofit");

    // No tags means no filter.
    let (_, all) = get(&router, "/api/grants").await;
    assert_eq!(all["total"], 2);
}

#[tokio::test]
async fn test_metrics_endpoint_exports_prometheus_text() {
    let router = test_router();
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("granary_taxonomy_tags"));
    assert!(text.contains("granary_uptime_seconds"));
}
