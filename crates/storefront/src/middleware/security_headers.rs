//! Response hardening headers.
//!
//! The storefront serves JSON and static assets, plus a checkout page that
//! embeds the gateway's widget. The policy is locked down except for the
//! gateway origins the widget needs to load, call home and open its frame.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

const CONTENT_SECURITY: &str = "default-src 'none'; \
     script-src 'self' https://checkout.razorpay.com; \
     style-src 'self'; \
     img-src 'self'; \
     font-src 'self'; \
     connect-src 'self' https://api.razorpay.com https://lumberjack.razorpay.com; \
     frame-src https://api.razorpay.com; \
     base-uri 'self'; \
     form-action 'self'; \
     frame-ancestors 'none'";

const PERMISSIONS: &str = "camera=(), microphone=(), geolocation=(), usb=(), \
     payment=(self \"https://api.razorpay.com\"), \
     publickey-credentials-get=(), browsing-topics=()";

/// Headers set on every response.
const FIXED: [(HeaderName, &str); 7] = [
    (X_FRAME_OPTIONS, "DENY"),
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (REFERRER_POLICY, "no-referrer"),
    (CONTENT_SECURITY_POLICY, CONTENT_SECURITY),
    (HeaderName::from_static("permissions-policy"), PERMISSIONS),
    // Gateway popups (UPI, netbanking) need their opener
    (
        HeaderName::from_static("cross-origin-opener-policy"),
        "same-origin-allow-popups",
    ),
    (
        HeaderName::from_static("cross-origin-resource-policy"),
        "same-origin",
    ),
];

/// Add security headers to all responses.
///
/// API responses carry per-user data (cart, orders, identity) and are marked
/// `no-store`. Static assets keep whatever caching the file service chose.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let is_static = request.uri().path().starts_with("/static/");
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for (name, value) in FIXED {
        headers.insert(name, HeaderValue::from_static(value));
    }

    if !is_static {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}
