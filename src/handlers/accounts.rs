use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    db,
    error::{AppError, AppResult},
    models::{CreateEmployeeAccount, CreateHrAccount, UpdateEmployee},
    AppState,
};

// ── HR accounts ───────────────────────────────────────────────────────────────

pub async fn get_hr_account(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let account = db::fetch_hr_by_email(&state.db, &email).await?;
    Ok((StatusCode::OK, Json(serde_json::json!({ "data": account }))))
}

/// Idempotent create: an existing email answers with a neutral message and
/// no insert, matching the registration flow's retry-on-refresh behavior.
pub async fn create_hr_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateHrAccount>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if payload.email.trim().is_empty() {
        return Err(AppError::BadRequest("email must not be empty".to_string()));
    }

    if db::hr_account_exists(&state.db, &payload.email).await? {
        return Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "account already exists",
                "inserted_id": null,
            })),
        ));
    }

    let account = db::insert_hr_account(&state.db, &payload).await?;

    info!(id = %account.id, email = %account.email, "Created HR account");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "data": account,
            "inserted_id": account.id,
        })),
    ))
}

// ── Employee accounts ─────────────────────────────────────────────────────────

pub async fn get_employee_account(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let account = db::fetch_employee_by_email(&state.db, &email).await?;
    Ok((StatusCode::OK, Json(serde_json::json!({ "data": account }))))
}

pub async fn create_employee_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateEmployeeAccount>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if payload.email.trim().is_empty() {
        return Err(AppError::BadRequest("email must not be empty".to_string()));
    }

    if db::employee_account_exists(&state.db, &payload.email).await? {
        return Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "account already exists",
                "inserted_id": null,
            })),
        ));
    }

    let account = db::insert_employee_account(&state.db, &payload).await?;

    info!(id = %account.id, email = %account.email, "Created employee account");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "data": account,
            "inserted_id": account.id,
        })),
    ))
}

/// Employees who have not joined an HR team yet (employee_status = false).
pub async fn list_unaffiliated_employees(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let employees = db::fetch_unaffiliated_employees(&state.db).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": employees,
            "count": employees.len(),
        })),
    ))
}

pub async fn list_employees_for_sponsor(
    State(state): State<AppState>,
    Path(hr_email): Path<String>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let employees = db::fetch_employees_for_sponsor(&state.db, &hr_email).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": employees,
            "count": employees.len(),
        })),
    ))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployee>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let account = db::update_employee(&state.db, id, &payload).await?;

    info!(id = %id, "Updated employee account");

    Ok((StatusCode::OK, Json(serde_json::json!({ "data": account }))))
}

// ── Cross-table lookups ───────────────────────────────────────────────────────

pub async fn get_user_role(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let role = db::lookup_role(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", email)))?;

    Ok((StatusCode::OK, Json(serde_json::json!({ "role": role }))))
}

/// Both account tables fetched concurrently, returned partitioned by kind.
pub async fn list_all_accounts(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let (hr, employees) = tokio::try_join!(
        db::fetch_all_hr_accounts(&state.db),
        db::fetch_all_employee_accounts(&state.db),
    )?;

    info!(
        hr = hr.len(),
        employees = employees.len(),
        "Listed all accounts"
    );

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "hr": hr,
            "employees": employees,
        })),
    ))
}
