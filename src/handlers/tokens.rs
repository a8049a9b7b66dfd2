use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
}

/// Exchange an email for a short-lived bearer token. Role is not embedded:
/// HR-only routes resolve it from the account store on every call.
pub async fn issue_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if payload.email.trim().is_empty() {
        return Err(AppError::BadRequest("email must not be empty".to_string()));
    }

    let token = state.jwt.issue(&payload.email)?;

    info!(email = %payload.email, "Issued token");

    Ok((StatusCode::OK, Json(serde_json::json!({ "token": token }))))
}
