use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    db,
    error::{AppError, AppResult},
    models::{AssetFilters, CreateAsset, SortOrder, TopRequestedParams, UpdateAsset},
    AppState,
};

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_assets(
    State(state): State<AppState>,
    Query(filters): Query<AssetFilters>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let start = Instant::now();
    let assets = db::fetch_assets(&state.db, &filters).await?;
    let elapsed = start.elapsed();

    info!(
        count = assets.len(),
        elapsed_ms = elapsed.as_millis(),
        "Listed assets"
    );

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": assets,
            "count": assets.len(),
            "query_time_ms": elapsed.as_secs_f64() * 1000.0,
        })),
    ))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_asset(
    State(state): State<AppState>,
    Json(payload): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if payload.product_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "product_name must not be empty".to_string(),
        ));
    }
    if payload.product_quantity.is_some_and(|q| q < 0) {
        return Err(AppError::BadRequest(
            "product_quantity must be >= 0".to_string(),
        ));
    }

    let asset = db::insert_asset(&state.db, &payload).await?;

    info!(id = %asset.id, name = %asset.product_name, "Created asset");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": asset })),
    ))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let asset = db::fetch_asset_by_id(&state.db, id).await?;
    Ok((StatusCode::OK, Json(serde_json::json!({ "data": asset }))))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAsset>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if payload.product_quantity.is_some_and(|q| q < 0) {
        return Err(AppError::BadRequest(
            "product_quantity must be >= 0".to_string(),
        ));
    }

    let asset = db::update_asset(&state.db, id, &payload).await?;

    info!(id = %id, "Updated asset");

    Ok((StatusCode::OK, Json(serde_json::json!({ "data": asset }))))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    db::delete_asset(&state.db, id).await?;

    info!(id = %id, "Deleted asset");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Asset deleted",
            "id": id,
        })),
    ))
}

// ── Top requested ─────────────────────────────────────────────────────────────

pub async fn top_requested(
    State(state): State<AppState>,
    Query(params): Query<TopRequestedParams>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let limit = params.limit.unwrap_or(5).clamp(1, 100);
    let order = params.order.unwrap_or(SortOrder::Desc);

    let assets = db::top_requested(&state.db, limit, order).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": assets,
            "count": assets.len(),
        })),
    ))
}
