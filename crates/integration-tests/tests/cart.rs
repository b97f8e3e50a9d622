//! Signed cart cookie.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

use bazaar_integration_tests::TestApp;

async fn add(app: &TestApp, cart: Option<&str>, product_id: &str) -> String {
    let cookies: Vec<&str> = cart.into_iter().collect();
    let response = app
        .send(
            Method::POST,
            "/api/add/cart",
            Some(json!({ "product_id": product_id })),
            &cookies,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.cookie("cart").unwrap()
}

#[tokio::test]
async fn test_add_and_remove_round_trip_through_cookie() {
    let app = TestApp::new();

    let cart = add(&app, None, "P1").await;
    let cart = add(&app, Some(&cart), "P1").await;
    let cart = add(&app, Some(&cart), "P2").await;

    let raw = app.send(Method::GET, "/api/cart/get", None, &[&cart]).await;
    assert_eq!(raw.body["response"], true);
    assert_eq!(
        raw.body["cart"],
        json!([{ "product_id": "P1", "qty": 2 }, { "product_id": "P2", "qty": 1 }])
    );

    let removed = app
        .send(
            Method::POST,
            "/api/remove/cart",
            Some(json!({ "product_id": "P2" })),
            &[&cart],
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(
        removed.body["cart"],
        json!([{ "product_id": "P1", "qty": 2 }])
    );
}

#[tokio::test]
async fn test_cart_view_joins_catalog() {
    let app = TestApp::new();
    let cart = add(&app, None, "P1").await;
    let cart = add(&app, Some(&cart), "P1").await;

    let view = app.send(Method::GET, "/api/cart", None, &[&cart]).await;

    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.body["item_count"], 2);
    assert_eq!(view.body["subtotal"], 200);
    assert_eq!(view.body["items"][0]["name"], "Brass Diya");
    assert_eq!(view.body["items"][0]["image"], "/static/diya.jpg");
    assert_eq!(view.body["items"][0]["line_total"], 200);
}

#[tokio::test]
async fn test_tampered_cookie_reads_as_empty() {
    let app = TestApp::new();
    let cart = add(&app, None, "P1").await;

    let (name_value, tag) = cart.rsplit_once('.').unwrap();
    let flipped = if tag.starts_with('0') { "1" } else { "0" };
    let tampered = format!("{name_value}.{flipped}{}", &tag[1..]);

    let raw = app
        .send(Method::GET, "/api/cart/get", None, &[&tampered])
        .await;
    assert_eq!(raw.status, StatusCode::OK);
    assert_eq!(raw.body["cart"], json!([]));

    let garbage = app
        .send(Method::GET, "/api/cart/get", None, &["cart=not-a-cart"])
        .await;
    assert_eq!(garbage.body["cart"], json!([]));
}

#[tokio::test]
async fn test_missing_product_id_is_rejected() {
    let app = TestApp::new();

    let response = app
        .send(Method::POST, "/api/add/cart", Some(json!({})), &[])
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Missing product_id");
    assert!(response.cookie("cart").is_none());
}

#[tokio::test]
async fn test_malformed_json_is_a_json_error() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/add/cart")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "failure");
}
