use axum::extract::State;
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::Serialize;

use super::ApiResponse;
use crate::db::{setup_repo, stats_repo};
use crate::errors::AppError;
use crate::journal::winrate::winrate_from_counts;
use crate::journal::round_ratio;
use crate::models::{CurrentUser, SetupPerformance};
use crate::AppState;

#[derive(Serialize)]
pub struct PerformanceSummary {
    pub total_trades: i64,
    pub win_count: i64,
    pub loss_count: i64,
    pub break_even_count: i64,
    pub winrate: Option<Decimal>,
    pub total_profit_loss: Decimal,
    pub avg_risk_ratio: Option<Decimal>,
    pub best_trade: Option<Decimal>,
    pub worst_trade: Option<Decimal>,
}

/// GET /api/stats/summary: aggregate performance over all the caller's trades
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<PerformanceSummary>>, AppError> {
    let agg = stats_repo::trade_aggregates(&state.db, user.id).await?;

    Ok(Json(ApiResponse::ok(PerformanceSummary {
        total_trades: agg.total_trades,
        win_count: agg.win_count,
        loss_count: agg.loss_count,
        break_even_count: agg.break_even_count,
        winrate: winrate_from_counts(agg.win_count, agg.total_trades),
        total_profit_loss: agg.total_profit_loss,
        avg_risk_ratio: agg.avg_risk_ratio.map(round_ratio),
        best_trade: agg.best_trade,
        worst_trade: agg.worst_trade,
    })))
}

/// GET /api/stats/setups: per-setup breakdown
pub async fn setups(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<SetupPerformance>>>, AppError> {
    let rows = setup_repo::setup_performance(&state.db, user.id).await?;
    Ok(Json(ApiResponse::ok(rows)))
}
