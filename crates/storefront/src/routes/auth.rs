//! Authentication route handlers.
//!
//! Signup and login are plain HTML form posts that redirect home on success.
//! Failures come back as the usual JSON error body.

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{ClientIp, OptionalAuth, clear_current_user, set_current_user};
use crate::models::UserRecord;
use crate::services::auth::{AuthService, Signup};
use crate::state::AppState;

/// Signup form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
}

/// Login form data. `username` may also be an email address.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Put the user in the session and tag Sentry with them.
async fn start_session(session: &Session, user: &UserRecord) -> Result<()> {
    let current = user.current_user();
    set_current_user(session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&current.id, Some(&current.email));
    Ok(())
}

/// Create an account and log it in.
///
/// POST /api/signup
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    ClientIp(ip): ClientIp,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.stores().users());
    let user = auth
        .register(Signup {
            username: &form.username,
            email: &form.email,
            password: &form.password,
            confirm: &form.confirm,
            ip: ip.map(|ip| ip.to_string()),
        })
        .await?;

    start_session(&session, &user).await?;
    Ok(Redirect::to("/").into_response())
}

/// Log in with a username or email and password.
///
/// POST /api/login
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.stores().users());
    let user = auth.login(&form.username, &form.password).await?;

    start_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Redirect::to("/").into_response())
}

/// Drop the session.
///
/// GET|POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

/// The session identity, or `null`.
///
/// GET /api/me
pub async fn me(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    Json(json!({ "user": user }))
}
