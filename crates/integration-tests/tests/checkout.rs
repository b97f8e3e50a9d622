//! Order creation and payment verification.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use bazaar_core::OrderId;
use bazaar_integration_tests::{TestApp, address, sign_payment};

async fn create(app: &TestApp, session: &str) -> String {
    let response = app
        .send(
            Method::POST,
            "/create-order",
            Some(json!({
                "cart": [{ "product_id": "P1", "qty": 2 }],
                "user_location": address(),
            })),
            &[session],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.body["gateway_order_id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_checkout_commits_to_log_and_history() {
    let app = TestApp::new();
    let session = app.signup("asha", "asha@example.com").await;

    let created = app
        .send(
            Method::POST,
            "/create-order",
            Some(json!({
                "cart": [{ "product_id": "P1", "qty": 2 }],
                "user_location": address(),
            })),
            &[&session],
        )
        .await;

    assert_eq!(created.status, StatusCode::OK);
    // 2 x 100 plus 5% tax, in minor units
    assert_eq!(created.body["amount"], 21000);
    assert_eq!(created.body["currency"], "INR");
    assert_eq!(created.body["key_id"], "rzp_test_key");
    let order_id = created.body["gateway_order_id"].as_str().unwrap().to_owned();

    let verified = app
        .send(
            Method::POST,
            "/verify-payment",
            Some(json!({
                "payment_id": "pay_42",
                "gateway_order_id": order_id,
                "signature": sign_payment(&order_id, "pay_42"),
            })),
            &[&session],
        )
        .await;

    assert_eq!(verified.status, StatusCode::OK, "{:?}", verified.body);
    assert_eq!(verified.body["status"], "success");
    assert_eq!(verified.body["order_id"], order_id.as_str());

    let log = app.state.stores().order_log().list().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].order_id, OrderId::new(order_id.clone()));
    assert_eq!(log[0].grand_total.as_i64(), 210);

    let orders = app
        .send(Method::GET, "/api/get-orders", None, &[&session])
        .await;
    assert_eq!(orders.status, StatusCode::OK);
    let orders = orders.body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["order_id"], order_id.as_str());
    assert_eq!(orders[0]["status"], "placed");
    assert!(orders[0]["delivery_eta"].is_string());
}

#[tokio::test]
async fn test_replayed_verification_is_not_found() {
    let app = TestApp::new();
    let session = app.signup("asha", "asha@example.com").await;
    let order_id = create(&app, &session).await;

    let body = json!({
        "payment_id": "pay_1",
        "gateway_order_id": order_id,
        "signature": sign_payment(&order_id, "pay_1"),
    });

    let first = app
        .send(Method::POST, "/verify-payment", Some(body.clone()), &[&session])
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let replay = app
        .send(Method::POST, "/verify-payment", Some(body), &[&session])
        .await;
    assert_eq!(replay.status, StatusCode::NOT_FOUND);
    assert_eq!(replay.body["status"], "failure");

    assert_eq!(app.state.stores().order_log().list().await.len(), 1);
}

#[tokio::test]
async fn test_bad_signature_keeps_order_pending() {
    let app = TestApp::new();
    let session = app.signup("asha", "asha@example.com").await;
    let order_id = create(&app, &session).await;

    let rejected = app
        .send(
            Method::POST,
            "/verify-payment",
            Some(json!({
                "payment_id": "pay_1",
                "gateway_order_id": order_id,
                "signature": sign_payment(&order_id, "pay_other"),
            })),
            &[&session],
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.body["error"], "Payment verification failed");
    assert!(app.state.stores().order_log().list().await.is_empty());

    // The staged order survives a bad attempt
    let retried = app
        .send(
            Method::POST,
            "/verify-payment",
            Some(json!({
                "payment_id": "pay_1",
                "gateway_order_id": order_id,
                "signature": sign_payment(&order_id, "pay_1"),
            })),
            &[&session],
        )
        .await;
    assert_eq!(retried.status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_order_requires_login() {
    let app = TestApp::new();

    let response = app
        .send(
            Method::POST,
            "/create-order",
            Some(json!({
                "cart": [{ "product_id": "P1", "qty": 1 }],
                "user_location": address(),
            })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.gateway.created(), 0);
}

#[tokio::test]
async fn test_create_order_validation() {
    let app = TestApp::new();
    let session = app.signup("asha", "asha@example.com").await;

    let empty = app
        .send(
            Method::POST,
            "/create-order",
            Some(json!({ "cart": [], "user_location": address() })),
            &[&session],
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let no_address = app
        .send(
            Method::POST,
            "/create-order",
            Some(json!({
                "cart": [{ "product_id": "P1", "qty": 1 }],
                "user_location": { "name": "Asha", "phone": "", "address": "", "pincode": "560001" },
            })),
            &[&session],
        )
        .await;
    assert_eq!(no_address.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        no_address.body["error"],
        "Missing user address fields: phone, address"
    );

    let unknown = app
        .send(
            Method::POST,
            "/create-order",
            Some(json!({
                "cart": [{ "product_id": "NOPE", "qty": 1 }],
                "user_location": address(),
            })),
            &[&session],
        )
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.gateway.created(), 0);
}

#[tokio::test]
async fn test_verify_accepts_gateway_field_names() {
    let app = TestApp::new();
    let session = app.signup("asha", "asha@example.com").await;
    let order_id = create(&app, &session).await;

    let response = app
        .send(
            Method::POST,
            "/verify-payment",
            Some(json!({
                "razorpay_payment_id": "pay_9",
                "razorpay_order_id": order_id,
                "razorpay_signature": sign_payment(&order_id, "pay_9"),
            })),
            &[&session],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
}

#[tokio::test]
async fn test_verify_missing_fields() {
    let app = TestApp::new();
    let session = app.signup("asha", "asha@example.com").await;

    let response = app
        .send(
            Method::POST,
            "/verify-payment",
            Some(json!({ "payment_id": "pay_1", "gateway_order_id": "order_x" })),
            &[&session],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Missing fields");
}

#[tokio::test]
async fn test_verify_unknown_order() {
    let app = TestApp::new();
    let session = app.signup("asha", "asha@example.com").await;

    let response = app
        .send(
            Method::POST,
            "/verify-payment",
            Some(json!({
                "payment_id": "pay_1",
                "gateway_order_id": "order_never",
                "signature": sign_payment("order_never", "pay_1"),
            })),
            &[&session],
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verify_after_logout_can_be_retried_after_login() {
    let app = TestApp::new();
    let session = app.signup("asha", "asha@example.com").await;
    let order_id = create(&app, &session).await;
    let payment = json!({
        "payment_id": "pay_1",
        "gateway_order_id": order_id,
        "signature": sign_payment(&order_id, "pay_1"),
    });

    app.send(Method::GET, "/auth/logout", None, &[&session])
        .await;
    let rejected = app
        .send(
            Method::POST,
            "/verify-payment",
            Some(payment.clone()),
            &[&session],
        )
        .await;

    assert_eq!(rejected.status, StatusCode::UNAUTHORIZED);
    assert_eq!(rejected.body["error"], "User not logged in");
    assert_eq!(app.state.stores().order_log().list().await.len(), 1);

    let login = app
        .post_form(
            "/api/login",
            &[("username", "asha"), ("password", "correct-horse")],
            &[],
        )
        .await;
    let session = login.cookie("bz_session").unwrap();
    let retried = app
        .send(Method::POST, "/verify-payment", Some(payment), &[&session])
        .await;

    assert_eq!(retried.status, StatusCode::OK, "{:?}", retried.body);
    assert_eq!(app.state.stores().order_log().list().await.len(), 1);

    let user = app
        .state
        .stores()
        .users()
        .get_by_login("asha")
        .await
        .unwrap();
    let history = app.state.stores().users().orders(&user.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].order_id, OrderId::new(order_id));
}
