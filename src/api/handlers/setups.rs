use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::ApiResponse;
use crate::db::setup_repo;
use crate::errors::AppError;
use crate::models::{
    CreateSetupInput, CurrentUser, SetupTrade, TradeDetail, TradeFilters, UpdateSetupInput,
};
use crate::services::trade_service;
use crate::AppState;

#[derive(Serialize)]
pub struct RecalculateResponse {
    pub setup_id: Uuid,
    pub winrate: Option<Decimal>,
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    Ok(())
}

/// GET /api/setups
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<SetupTrade>>>, AppError> {
    let setups = setup_repo::list_setups(&state.db, user.id).await?;
    Ok(Json(ApiResponse::ok(setups)))
}

/// POST /api/setups: new setups start with no winrate
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateSetupInput>,
) -> Result<Json<ApiResponse<SetupTrade>>, AppError> {
    validate_name(&body.name)?;

    let setup = setup_repo::create_setup(
        &state.db,
        user.id,
        body.name.trim(),
        &body.strategy,
        &body.notes,
    )
    .await?;

    tracing::info!(setup_id = %setup.id, user_id = %user.id, "Setup created");
    Ok(Json(ApiResponse::ok(setup)))
}

/// GET /api/setups/:id
pub async fn detail(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SetupTrade>>, AppError> {
    let setup = setup_repo::get_setup(&state.db, user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("setup not found".into()))?;

    Ok(Json(ApiResponse::ok(setup)))
}

/// PUT /api/setups/:id: name, strategy and notes only
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(mut body): Json<UpdateSetupInput>,
) -> Result<Json<ApiResponse<SetupTrade>>, AppError> {
    if let Some(name) = body.name.take() {
        validate_name(&name)?;
        body.name = Some(name.trim().to_string());
    }

    let setup = setup_repo::update_setup(&state.db, user.id, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound("setup not found".into()))?;

    Ok(Json(ApiResponse::ok(setup)))
}

/// DELETE /api/setups/:id: linked trades are kept and unlinked
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    trade_service::delete_setup(&state.db, user.id, id).await?;
    Ok(Json(ApiResponse::ok(())))
}

/// GET /api/setups/:id/trades?outcome&from&to&page&limit
pub async fn trades(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Query(filters): Query<TradeFilters>,
) -> Result<Json<ApiResponse<Vec<TradeDetail>>>, AppError> {
    setup_repo::get_setup(&state.db, user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("setup not found".into()))?;

    let filters = TradeFilters {
        setup_id: Some(id),
        ..filters
    };
    let trades = trade_service::list_trade_details(&state.db, user.id, &filters).await?;

    Ok(Json(ApiResponse::ok(trades)))
}

/// POST /api/setups/:id/recalculate: full recount of the cached winrate
pub async fn recalculate(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RecalculateResponse>>, AppError> {
    let winrate = trade_service::recalculate_setup_winrate(&state.db, user.id, id).await?;

    Ok(Json(ApiResponse::ok(RecalculateResponse {
        setup_id: id,
        winrate,
    })))
}
