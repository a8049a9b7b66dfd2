use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::Claims,
    db,
    error::{AppError, AppResult},
    models::{CreateRequest, EmployeeRequestFilters, SponsorRequestFilters, UpdateRequest},
    AppState,
};

use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct PendingParams {
    pub limit: Option<i64>,
}

// ── Employee side ─────────────────────────────────────────────────────────────

/// Create a request for the calling employee. Requester identity and the
/// sponsoring HR come from the employee's own account record; the insert and
/// the stock reservation commit together or not at all.
pub async fn create_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let employee = db::fetch_employee_by_email(&state.db, &claims.sub).await?;
    let hr_email = employee.hr_email.clone().ok_or_else(|| {
        AppError::BadRequest("employee is not affiliated with an HR team".to_string())
    })?;

    let (request, asset) = db::create_request(&state.db, &employee, &hr_email, &payload).await?;

    info!(
        id = %request.id,
        asset_id = %asset.id,
        requester = %request.requester_email,
        remaining_quantity = ?asset.product_quantity,
        "Created asset request"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": request })),
    ))
}

pub async fn list_my_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filters): Query<EmployeeRequestFilters>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let requests = db::fetch_requests_for_employee(&state.db, &claims.sub, &filters).await?;

    info!(
        email = %claims.sub,
        count = requests.len(),
        "Listed employee requests"
    );

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": requests,
            "count": requests.len(),
        })),
    ))
}

pub async fn list_my_pending_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let filters = EmployeeRequestFilters {
        status: Some("Pending".to_string()),
        ..Default::default()
    };
    let requests = db::fetch_requests_for_employee(&state.db, &claims.sub, &filters).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": requests,
            "count": requests.len(),
        })),
    ))
}

pub async fn list_my_monthly_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let requests = db::fetch_monthly_for_employee(&state.db, &claims.sub).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": requests,
            "count": requests.len(),
        })),
    ))
}

// ── Sponsor side ──────────────────────────────────────────────────────────────

pub async fn list_sponsored_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filters): Query<SponsorRequestFilters>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let requests = db::fetch_requests_for_sponsor(&state.db, &claims.sub, &filters).await?;

    info!(
        hr_email = %claims.sub,
        count = requests.len(),
        "Listed sponsored requests"
    );

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": requests,
            "count": requests.len(),
        })),
    ))
}

pub async fn list_sponsored_pending_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<PendingParams>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let limit = params.limit.unwrap_or(5).clamp(1, 100);
    let requests = db::fetch_pending_for_sponsor(&state.db, &claims.sub, limit).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": requests,
            "count": requests.len(),
        })),
    ))
}

// ── Status updates ────────────────────────────────────────────────────────────

pub async fn update_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let request = db::update_request(&state.db, id, &payload).await?;

    info!(id = %id, status = ?request.status, "Updated asset request");

    Ok((StatusCode::OK, Json(serde_json::json!({ "data": request }))))
}
