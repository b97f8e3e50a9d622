//! Catalog API, health checks, contact form and response headers.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use bazaar_integration_tests::{TestApp, test_config};
use bazaar_storefront::db::Stores;

#[tokio::test]
async fn test_product_listing() {
    let app = TestApp::new();

    let response = app.send(Method::GET, "/api/products", None, &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["response"], true);
    let products = response.body["products"].as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["image"], "/static/diya.jpg");
    assert_eq!(products[1]["image"], "/static/durrie.jpg");
}

#[tokio::test]
async fn test_product_detail_keeps_extra_fields() {
    let app = TestApp::new();

    let response = app.send(Method::GET, "/api/product/P1", None, &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["product"]["name"], "Brass Diya");
    assert_eq!(response.body["product"]["price"], 100);
    assert_eq!(response.body["product"]["category"], "decor");
}

#[tokio::test]
async fn test_unknown_product() {
    let app = TestApp::new();

    let response = app.send(Method::GET, "/api/product/P404", None, &[]).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["response"], false);
    assert_eq!(response.body["error"], "Product not found");
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let live = app.send(Method::GET, "/health", None, &[]).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, json!("ok"));

    let ready = app.send(Method::GET, "/health/ready", None, &[]).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_fails_when_data_dir_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    tokio::fs::create_dir(&data_dir).await.unwrap();
    let stores = Stores::open(&data_dir).await.unwrap();
    let app = TestApp::with_stores(stores, test_config());

    let ready = app.send(Method::GET, "/health/ready", None, &[]).await;
    assert_eq!(ready.status, StatusCode::OK);

    tokio::fs::remove_dir_all(&data_dir).await.unwrap();
    let gone = app.send(Method::GET, "/health/ready", None, &[]).await;
    assert_eq!(gone.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_contact_form_is_saved() {
    let app = TestApp::new();

    let response = app
        .send(
            Method::POST,
            "/api/save/response",
            Some(json!({
                "full_name": "Asha Rao",
                "email_address": "asha@example.com",
                "subject": "Bulk order",
                "message": "Do you ship to Pune?",
            })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);

    let saved = app.state.stores().responses().list().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].subject.as_deref(), Some("Bulk order"));
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = TestApp::new();

    let response = app.send(Method::GET, "/api/products", None, &[]).await;

    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    let csp = response.headers["content-security-policy"].to_str().unwrap();
    assert!(csp.contains("https://checkout.razorpay.com"));
    assert!(response.headers.contains_key("x-request-id"));
}
