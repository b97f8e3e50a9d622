//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Provides configurable rate limiters for different endpoint categories:
//! - `auth_rate_limiter`: Strict limits for signup and login (~10/min)
//! - `api_rate_limiter`: Relaxed limits for general API endpoints (~100/min)
//!
//! Both are skipped when `STOREFRONT_RATE_LIMIT=false`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{Extensions, HeaderMap, Request, request::Parts};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers carrying the client address, most specific first.
const CLIENT_IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Client IP from proxy headers.
///
/// For `X-Forwarded-For` the first address in the chain is used.
#[must_use]
pub fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

/// Proxy headers first, then the peer address when there is no proxy.
fn request_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    client_ip(headers).or_else(|| {
        extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

/// Extractor for the client address, `None` when neither a proxy header
/// nor connection info is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(request_ip(&parts.headers, &parts.extensions)))
    }
}

/// Key extractor for the rate limiters, keyed like [`ClientIp`].
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        request_ip(req.headers(), req.extensions()).ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(replenish_secs: u64, burst: u32) -> Option<RateLimiterLayer> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(replenish_secs)
        .burst_size(burst)
        .finish();

    if config.is_none() {
        tracing::warn!(replenish_secs, burst, "Invalid rate limiter config, limiter disabled");
    }
    config.map(|c| GovernorLayer::new(Arc::new(c)))
}

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
#[must_use]
pub fn auth_rate_limiter() -> Option<RateLimiterLayer> {
    limiter(6, 5)
}

/// Create rate limiter for general API: ~100 requests per minute per IP.
///
/// Configuration: 1 request per second (replenish), burst of 50.
#[must_use]
pub fn api_rate_limiter() -> Option<RateLimiterLayer> {
    limiter(1, 50)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    async fn extract(request: Request<()>) -> ClientIp {
        let (mut parts, ()) = request.into_parts();
        ClientIp::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_client_ip_falls_back_to_peer_address() {
        let peer: SocketAddr = "198.51.100.4:52100".parse().unwrap();
        let mut direct = Request::new(());
        direct.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(extract(direct).await, ClientIp(Some(peer.ip())));

        let mut proxied = Request::new(());
        proxied.extensions_mut().insert(ConnectInfo(peer));
        proxied
            .headers_mut()
            .insert("x-real-ip", HeaderValue::from_static("203.0.113.7"));
        assert_eq!(extract(proxied).await, ClientIp("203.0.113.7".parse().ok()));

        assert_eq!(extract(Request::new(())).await, ClientIp(None));
    }

    #[test]
    fn test_client_ip_prefers_cloudflare_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        assert_eq!(client_ip(&headers), "10.0.0.1".parse().ok());

        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.7"));
        assert_eq!(client_ip(&headers), "203.0.113.7".parse().ok());
    }

    #[test]
    fn test_client_ip_ignores_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("not-an-ip"));
        assert_eq!(client_ip(&headers), None);
    }

    #[test]
    fn test_limiters_build() {
        assert!(auth_rate_limiter().is_some());
        assert!(api_rate_limiter().is_some());
    }
}
