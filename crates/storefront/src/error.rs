//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error renders as `{"status": "failure", "error": message}`.

use std::borrow::Cow;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::payments::GatewayError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;

const INTERNAL_MESSAGE: &str = "Internal server error";
const UPSTREAM_MESSAGE: &str = "External service error";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Payment gateway operation failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request is missing or has invalid fields.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code and client-facing message.
    ///
    /// Server-side failures never expose their details.
    fn classify(&self) -> (StatusCode, Cow<'static, str>) {
        const INTERNAL: (StatusCode, Cow<'static, str>) =
            (StatusCode::INTERNAL_SERVER_ERROR, Cow::Borrowed(INTERNAL_MESSAGE));
        const UPSTREAM: (StatusCode, Cow<'static, str>) =
            (StatusCode::BAD_GATEWAY, Cow::Borrowed(UPSTREAM_MESSAGE));

        match self {
            Self::Repository(RepositoryError::Conflict(_)) => {
                (StatusCode::CONFLICT, "Conflict".into())
            }
            Self::Repository(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "Not found".into())
            }
            Self::Repository(_) | Self::Internal(_) => INTERNAL,
            Self::Gateway(_) => UPSTREAM,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "Invalid credentials".into())
                }
                AuthError::UserAlreadyExists => (
                    StatusCode::CONFLICT,
                    "An account with this email already exists".into(),
                ),
                AuthError::InvalidEmail(_) => {
                    (StatusCode::BAD_REQUEST, "Invalid email address".into())
                }
                AuthError::MissingField(msg) => (StatusCode::BAD_REQUEST, (*msg).into()),
                AuthError::PasswordMismatch => {
                    (StatusCode::BAD_REQUEST, "Passwords do not match".into())
                }
                AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg.clone().into()),
                AuthError::Repository(_) | AuthError::PasswordHash => INTERNAL,
            },
            Self::Order(err) => match err {
                OrderError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, (*msg).into()),
                OrderError::NotFound(msg) => (StatusCode::NOT_FOUND, (*msg).into()),
                OrderError::VerificationFailed => {
                    (StatusCode::BAD_REQUEST, "Payment verification failed".into())
                }
                OrderError::Validation(_) | OrderError::Pricing(_) => {
                    (StatusCode::BAD_REQUEST, err.to_string().into())
                }
                OrderError::Gateway(_) => UPSTREAM,
                OrderError::DuplicateKey(_) | OrderError::Repository(_) => INTERNAL,
            },
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone().into()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone().into()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone().into()),
            Self::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Too many requests".into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.classify();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = json!({
            "status": "failure",
            "error": message,
        });
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "P1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
