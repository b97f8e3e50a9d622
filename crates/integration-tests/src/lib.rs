//! Integration tests for Bazaar.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! The storefront router is driven in-process with `tower::ServiceExt::oneshot`.
//! Stores are in memory and the payment gateway is a fake that signs payments
//! with the same HMAC routine the real adapter verifies with.
//!
//! # Test Categories
//!
//! - `accounts` - Signup, login, logout, session identity
//! - `cart` - Signed cart cookie
//! - `checkout` - Order creation and payment verification
//! - `orders` - History, cancel, reorder
//! - `products` - Catalog API, health, response headers

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use bazaar_core::{OrderId, PaymentId};
use bazaar_storefront::catalog::StaticCatalog;
use bazaar_storefront::config::{RazorpayConfig, SentryConfig, StorefrontConfig};
use bazaar_storefront::db::Stores;
use bazaar_storefront::payments::{GatewayError, GatewayOrder, PaymentGateway, signature};
use bazaar_storefront::state::AppState;

/// Gateway key secret shared by the fake gateway and [`sign_payment`].
pub const GATEWAY_SECRET: &str = "ZmFrZS1nYXRld2F5LXNlY3JldA";

/// Session and cart signing secret for tests.
pub const SESSION_SECRET: &str = "k2Vq9xTn4Lw8Rb3Zp7Hs1Yc6Mf0Jd5Ug";

/// Catalog used by every test: P1 costs 100, P2 costs 250.
pub const CATALOG_JSON: &str = r#"[
    {"id": "P1", "name": "Brass Diya", "price": 100, "image": "diya.jpg", "category": "decor"},
    {"id": "P2", "name": "Cotton Durrie", "price": 250, "image": "/static/durrie.jpg"}
]"#;

/// Payment gateway that hands out sequential order ids.
#[derive(Debug, Default)]
pub struct FakeGateway {
    created: AtomicUsize,
}

impl FakeGateway {
    /// Number of gateway orders created so far.
    #[must_use]
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        _amount_minor: i64,
        _currency: &str,
        _auto_capture: bool,
    ) -> Result<GatewayOrder, GatewayError> {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayOrder {
            id: OrderId::new(format!("order_test{n}")),
        })
    }

    fn verify_signature(
        &self,
        payment_id: &PaymentId,
        order_id: &OrderId,
        sig: &str,
    ) -> Result<(), GatewayError> {
        signature::verify(order_id, payment_id, sig, GATEWAY_SECRET)
    }
}

/// Signature the checkout widget would return for this payment.
///
/// # Panics
///
/// Panics if signing fails, which it cannot for a non-empty key.
#[must_use]
pub fn sign_payment(order_id: &str, payment_id: &str) -> String {
    signature::sign(
        &OrderId::new(order_id),
        &PaymentId::new(payment_id),
        GATEWAY_SECRET,
    )
    .expect("signing with a fixed key")
}

/// Storefront configuration for tests. Rate limits are off.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from(SESSION_SECRET),
        data_dir: PathBuf::from("data"),
        catalog_path: PathBuf::from("products.json"),
        static_dir: PathBuf::from("static"),
        rate_limit: false,
        pending_order_ttl: Duration::from_secs(600),
        razorpay: RazorpayConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: SecretString::from(GATEWAY_SECRET),
            api_base: "http://127.0.0.1:9".to_string(),
            currency: "INR".to_string(),
            timeout: Duration::from_secs(1),
        },
        sentry: SentryConfig::default(),
    }
}

/// A parsed response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Value of the `name` cookie set by this response, as `name=value`.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with(&format!("{name}=")))
            .map(str::to_owned)
    }
}

/// The storefront router plus handles to its state.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub gateway: Arc<FakeGateway>,
}

impl TestApp {
    /// Build an app over in-memory stores and the test catalog.
    ///
    /// # Panics
    ///
    /// Panics if the fixed catalog or configuration is rejected.
    #[must_use]
    pub fn new() -> Self {
        Self::with_stores(Stores::in_memory(), test_config())
    }

    /// Build an app over the given stores and configuration.
    ///
    /// # Panics
    ///
    /// Panics if the fixed catalog or configuration is rejected.
    #[must_use]
    pub fn with_stores(stores: Stores, config: StorefrontConfig) -> Self {
        let catalog = StaticCatalog::from_products(
            serde_json::from_str(CATALOG_JSON).expect("catalog fixture parses"),
        )
        .expect("catalog fixture is valid");
        let gateway = Arc::new(FakeGateway::default());

        let state = AppState::new(config, Arc::new(catalog), stores, gateway.clone())
            .expect("state builds");

        Self {
            router: bazaar_storefront::app(state.clone()),
            state,
            gateway,
        }
    }

    /// Send a request, with an optional JSON body and `Cookie` header.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not JSON.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        json: Option<Value>,
        cookies: &[&str],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if !cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookies.join("; "));
        }
        let request = match json {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        self.dispatch(request).await
    }

    /// Post a URL-encoded form. Values must not need escaping.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookies: &[&str],
    ) -> TestResponse {
        let encoded = fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if !cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookies.join("; "));
        }
        let request = builder.body(Body::from(encoded)).expect("request builds");

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sign up a user and return their session cookie.
    ///
    /// # Panics
    ///
    /// Panics if signup does not redirect with a session cookie.
    pub async fn signup(&self, username: &str, email: &str) -> String {
        let response = self
            .post_form(
                "/api/signup",
                &[
                    ("username", username),
                    ("email", email),
                    ("password", "correct-horse"),
                    ("confirm", "correct-horse"),
                ],
                &[],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{:?}", response.body);

        response
            .cookie("bz_session")
            .expect("signup sets a session cookie")
    }

    /// Create and verify an order for `cart`, returning the gateway order id.
    ///
    /// # Panics
    ///
    /// Panics if either step fails.
    pub async fn place_order(&self, session: &str, cart: Value) -> String {
        let created = self
            .send(
                Method::POST,
                "/create-order",
                Some(serde_json::json!({ "cart": cart, "user_location": address() })),
                &[session],
            )
            .await;
        assert_eq!(created.status, StatusCode::OK, "{:?}", created.body);

        let order_id = created.body["gateway_order_id"]
            .as_str()
            .expect("gateway order id")
            .to_owned();
        let verified = self
            .send(
                Method::POST,
                "/verify-payment",
                Some(serde_json::json!({
                    "payment_id": "pay_1",
                    "gateway_order_id": order_id,
                    "signature": sign_payment(&order_id, "pay_1"),
                })),
                &[session],
            )
            .await;
        assert_eq!(verified.status, StatusCode::OK, "{:?}", verified.body);

        order_id
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete shipping address.
#[must_use]
pub fn address() -> Value {
    serde_json::json!({
        "name": "Asha Rao",
        "phone": 9_876_543_210_u64,
        "address": "12 MG Road, Bengaluru",
        "pincode": "560001",
    })
}
