//! Signup, login, logout and session identity.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode, header},
};
use tower::ServiceExt;

use bazaar_integration_tests::TestApp;

#[tokio::test]
async fn test_signup_starts_a_session() {
    let app = TestApp::new();

    let session = app.signup("asha", "Asha@Example.com").await;
    let me = app.send(Method::GET, "/api/me", None, &[&session]).await;

    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["username"], "asha");
    assert_eq!(me.body["user"]["email"], "asha@example.com");

    let stored = app.state.stores().users().get_by_login("asha").await.unwrap();
    assert!(stored.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn test_signup_records_peer_address_without_proxy() {
    let app = TestApp::new();
    let peer: SocketAddr = "198.51.100.4:52100".parse().unwrap();
    let mut request = Request::builder()
        .method(Method::POST)
        .uri("/api/signup")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "username=asha&email=asha@example.com&password=correct-horse&confirm=correct-horse",
        ))
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let stored = app.state.stores().users().get_by_login("asha").await.unwrap();
    assert_eq!(stored.ip.as_deref(), Some("198.51.100.4"));
}

#[tokio::test]
async fn test_me_without_session_is_null() {
    let app = TestApp::new();

    let me = app.send(Method::GET, "/api/me", None, &[]).await;

    assert_eq!(me.status, StatusCode::OK);
    assert!(me.body["user"].is_null());
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let app = TestApp::new();
    app.signup("asha", "asha@example.com").await;

    let again = app
        .post_form(
            "/api/signup",
            &[
                ("username", "asha2"),
                ("email", "ASHA@example.com"),
                ("password", "correct-horse"),
                ("confirm", "correct-horse"),
            ],
            &[],
        )
        .await;

    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["error"], "An account with this email already exists");
}

#[tokio::test]
async fn test_signup_rejects_mismatched_confirmation() {
    let app = TestApp::new();

    let response = app
        .post_form(
            "/api/signup",
            &[
                ("username", "asha"),
                ("email", "asha@example.com"),
                ("password", "correct-horse"),
                ("confirm", "battery-staple"),
            ],
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Passwords do not match");
    assert!(response.cookie("bz_session").is_none());
}

#[tokio::test]
async fn test_login_by_username_or_email() {
    let app = TestApp::new();
    app.signup("asha", "asha@example.com").await;

    for login in ["asha", "asha@example.com"] {
        let response = app
            .post_form(
                "/api/login",
                &[("username", login), ("password", "correct-horse")],
                &[],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{login}");
        assert_eq!(response.headers[header::LOCATION], "/");

        let session = response.cookie("bz_session").unwrap();
        let me = app.send(Method::GET, "/api/me", None, &[&session]).await;
        assert_eq!(me.body["user"]["username"], "asha");
    }
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new();
    app.signup("asha", "asha@example.com").await;

    let response = app
        .post_form(
            "/api/login",
            &[("username", "asha"), ("password", "not-the-password")],
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Invalid credentials");

    let unknown = app
        .post_form(
            "/api/login",
            &[("username", "nobody"), ("password", "correct-horse")],
            &[],
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();
    let session = app.signup("asha", "asha@example.com").await;

    let logout = app.send(Method::GET, "/auth/logout", None, &[&session]).await;
    assert_eq!(logout.status, StatusCode::SEE_OTHER);

    let me = app.send(Method::GET, "/api/me", None, &[&session]).await;
    assert!(me.body["user"].is_null());
}
