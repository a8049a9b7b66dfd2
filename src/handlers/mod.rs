pub mod accounts;
pub mod assets;
pub mod requests;
pub mod tokens;

use axum::{http::StatusCode, Json};
use serde_json::json;

pub async fn index() -> &'static str {
    "Manage your assets with ease"
}

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "service": "asset-ease" })))
}
