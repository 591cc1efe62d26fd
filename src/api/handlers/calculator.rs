use axum::Json;

use super::ApiResponse;
use crate::errors::AppError;
use crate::journal::{DerivedFields, TradeInputs};
use crate::services::trade_service;

/// POST /api/calculator: derived fields for a prospective trade, not stored
pub async fn preview(
    Json(body): Json<TradeInputs>,
) -> Result<Json<ApiResponse<DerivedFields>>, AppError> {
    let derived = trade_service::preview(&body)?;
    Ok(Json(ApiResponse::ok(derived)))
}
