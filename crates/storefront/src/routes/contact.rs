//! Contact form route handler.

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::instrument;

use crate::error::Result;
use crate::models::ContactResponse;
use crate::routes::JsonBody;
use crate::state::AppState;

/// Store a contact form submission.
///
/// POST /api/save/response
#[instrument(skip(state, form), fields(subject = ?form.subject))]
pub async fn save_response(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<ContactResponse>,
) -> Result<impl IntoResponse> {
    state.stores().responses().append(form).await?;
    tracing::info!("Contact response saved");

    Ok(Json(json!({ "success": true, "message": "Saved successfully" })))
}
