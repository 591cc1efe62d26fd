use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use uuid::Uuid;

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::{CreateTradeInput, CurrentUser, TradeDetail, TradeFilters, UpdateTradeInput};
use crate::services::trade_service;
use crate::AppState;

/// GET /api/trades: the caller's trades, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(filters): Query<TradeFilters>,
) -> Result<Json<ApiResponse<Vec<TradeDetail>>>, AppError> {
    let trades = trade_service::list_trade_details(&state.db, user.id, &filters).await?;
    Ok(Json(ApiResponse::ok(trades)))
}

/// POST /api/trades
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateTradeInput>,
) -> Result<Json<ApiResponse<TradeDetail>>, AppError> {
    let trade = trade_service::create_trade(&state.db, user.id, body).await?;
    Ok(Json(ApiResponse::ok(trade)))
}

/// GET /api/trades/:id
pub async fn detail(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TradeDetail>>, AppError> {
    let trade = trade_service::get_trade_detail(&state.db, user.id, id).await?;
    Ok(Json(ApiResponse::ok(trade)))
}

/// PUT /api/trades/:id: partial update, derived fields recomputed
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTradeInput>,
) -> Result<Json<ApiResponse<TradeDetail>>, AppError> {
    let trade = trade_service::update_trade(&state.db, user.id, id, body).await?;
    Ok(Json(ApiResponse::ok(trade)))
}

/// DELETE /api/trades/:id
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    trade_service::delete_trade(&state.db, user.id, id).await?;
    Ok(Json(ApiResponse::ok(())))
}
