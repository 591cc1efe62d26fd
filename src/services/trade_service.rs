use std::time::Instant;

use metrics::{counter, histogram};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::db::tag_repo;
use crate::db::setup_repo;
use crate::db::trade_repo::{self, TradeWrite};
use crate::errors::AppError;
use crate::journal::{
    calculate_derived_fields, compute_winrate, risk_ratio, DerivedFields, TradeInputs,
};
use crate::models::{CreateTradeInput, TradeDetail, TradeFilters, UpdateTradeInput};

/// Largest absolute price or lot size accepted. Keeps products of two
/// inputs well inside `Decimal` range.
pub const MAX_MAGNITUDE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0); // 1e12

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject inputs the calculator must never see.
pub fn validate_inputs(inputs: &TradeInputs) -> Result<(), AppError> {
    if inputs.lot_size <= Decimal::ZERO {
        return Err(AppError::BadRequest("lot_size must be positive".into()));
    }

    let fields = [
        ("entry_price", inputs.entry_price),
        ("exit_price", inputs.exit_price),
        ("take_profit", inputs.take_profit),
        ("stoploss", inputs.stoploss),
        ("lot_size", inputs.lot_size),
    ];

    for (name, value) in fields {
        if value < Decimal::ZERO {
            return Err(AppError::BadRequest(format!("{name} must not be negative")));
        }
        if value > MAX_MAGNITUDE {
            return Err(AppError::BadRequest(format!("{name} is out of range")));
        }
    }

    if risk_ratio(inputs).is_none() {
        return Err(AppError::BadRequest(
            "stoploss is too close to entry_price for the take_profit distance".into(),
        ));
    }

    Ok(())
}

/// Validate and compute derived fields without touching storage.
pub fn preview(inputs: &TradeInputs) -> Result<DerivedFields, AppError> {
    validate_inputs(inputs)?;
    Ok(calculate_derived_fields(inputs))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

pub async fn create_trade(
    pool: &PgPool,
    user_id: Uuid,
    input: CreateTradeInput,
) -> Result<TradeDetail, AppError> {
    let inputs = input.inputs();
    validate_inputs(&inputs)?;
    let derived = calculate_derived_fields(&inputs);

    let mut tx = pool.begin().await?;

    if let Some(setup_id) = input.setup_trade_id {
        if !setup_repo::lock_setup(&mut *tx, user_id, setup_id).await? {
            return Err(AppError::NotFound("setup not found".into()));
        }
    }
    ensure_tags_owned(&mut tx, user_id, &input.tag_ids).await?;

    let write = TradeWrite {
        setup_trade_id: input.setup_trade_id,
        inputs,
        derived,
        trade_date: input.trade_date,
        notes: input.notes.as_deref(),
        screenshot_url: input.screenshot_url.as_deref(),
    };
    let trade = trade_repo::insert_trade(&mut *tx, user_id, &write).await?;
    tag_repo::replace_trade_tags(&mut tx, trade.id, &input.tag_ids).await?;

    let winrate = match trade.setup_trade_id {
        Some(setup_id) => Some(recalculate_locked(&mut tx, user_id, setup_id).await?),
        None => None,
    };

    let tags = tag_repo::tags_for_trade(&mut *tx, trade.id).await?;
    tx.commit().await?;

    counter!("trades_created_total").increment(1);
    tracing::info!(
        trade_id = %trade.id,
        user_id = %user_id,
        outcome = %trade.outcome,
        profit_loss = %trade.profit_loss,
        setup_id = ?trade.setup_trade_id,
        winrate = ?winrate,
        "Trade created"
    );

    Ok(TradeDetail { trade, tags })
}

pub async fn update_trade(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: UpdateTradeInput,
) -> Result<TradeDetail, AppError> {
    let mut tx = pool.begin().await?;

    let current = trade_repo::lock_trade(&mut *tx, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;

    let inputs = input.merged_inputs(&current);
    validate_inputs(&inputs)?;
    let derived = calculate_derived_fields(&inputs);

    let new_setup = input.resolved_setup(&current);
    let affected = affected_setups(current.setup_trade_id, new_setup);

    for setup_id in &affected {
        let locked = setup_repo::lock_setup(&mut *tx, user_id, *setup_id).await?;
        if !locked && Some(*setup_id) == new_setup {
            return Err(AppError::NotFound("setup not found".into()));
        }
    }

    if let Some(tag_ids) = &input.tag_ids {
        ensure_tags_owned(&mut tx, user_id, tag_ids).await?;
        tag_repo::replace_trade_tags(&mut tx, id, tag_ids).await?;
    }

    let write = TradeWrite {
        setup_trade_id: new_setup,
        inputs,
        derived,
        trade_date: input.trade_date.unwrap_or(current.trade_date),
        notes: match &input.notes {
            Some(notes) => notes.as_deref(),
            None => current.notes.as_deref(),
        },
        screenshot_url: match &input.screenshot_url {
            Some(url) => url.as_deref(),
            None => current.screenshot_url.as_deref(),
        },
    };
    let trade = trade_repo::update_trade(&mut *tx, user_id, id, &write).await?;

    for setup_id in &affected {
        recalculate_locked(&mut tx, user_id, *setup_id).await?;
    }

    let tags = tag_repo::tags_for_trade(&mut *tx, trade.id).await?;
    tx.commit().await?;

    counter!("trades_updated_total").increment(1);
    tracing::info!(
        trade_id = %trade.id,
        user_id = %user_id,
        outcome = %trade.outcome,
        previous_setup = ?current.setup_trade_id,
        setup_id = ?trade.setup_trade_id,
        "Trade updated"
    );

    Ok(TradeDetail { trade, tags })
}

pub async fn delete_trade(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let current = trade_repo::lock_trade(&mut *tx, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;

    if let Some(setup_id) = current.setup_trade_id {
        setup_repo::lock_setup(&mut *tx, user_id, setup_id).await?;
    }

    trade_repo::delete_trade(&mut *tx, user_id, id).await?;

    if let Some(setup_id) = current.setup_trade_id {
        recalculate_locked(&mut tx, user_id, setup_id).await?;
    }

    tx.commit().await?;

    counter!("trades_deleted_total").increment(1);
    tracing::info!(
        trade_id = %id,
        user_id = %user_id,
        setup_id = ?current.setup_trade_id,
        "Trade deleted"
    );

    Ok(())
}

/// Delete a setup, unlinking its trades. Linked trade rows are locked
/// before the setup row, the same order trade mutations use.
pub async fn delete_setup(pool: &PgPool, user_id: Uuid, setup_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT id FROM trades WHERE setup_trade_id = $1 AND user_id = $2 ORDER BY id FOR UPDATE")
        .bind(setup_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if !setup_repo::delete_setup(&mut *tx, user_id, setup_id).await? {
        return Err(AppError::NotFound("setup not found".into()));
    }

    tx.commit().await?;
    tracing::info!(setup_id = %setup_id, user_id = %user_id, "Setup deleted");

    Ok(())
}

// ---------------------------------------------------------------------------
// Winrate recalculation
// ---------------------------------------------------------------------------

/// Recount a setup's winrate in its own transaction.
pub async fn recalculate_setup_winrate(
    pool: &PgPool,
    user_id: Uuid,
    setup_id: Uuid,
) -> Result<Option<Decimal>, AppError> {
    let mut tx = pool.begin().await?;

    if !setup_repo::lock_setup(&mut *tx, user_id, setup_id).await? {
        return Err(AppError::NotFound("setup not found".into()));
    }

    let winrate = recalculate_locked(&mut tx, user_id, setup_id).await?;
    tx.commit().await?;

    Ok(winrate)
}

/// Full recount and overwrite. The caller must already hold the setup's
/// row lock in the same transaction.
async fn recalculate_locked(
    conn: &mut PgConnection,
    user_id: Uuid,
    setup_id: Uuid,
) -> anyhow::Result<Option<Decimal>> {
    let started = Instant::now();

    let outcomes = trade_repo::outcomes_for_setup(&mut *conn, user_id, setup_id).await?;
    let total = outcomes.len();
    let winrate = compute_winrate(outcomes);
    setup_repo::set_winrate(&mut *conn, setup_id, winrate).await?;

    counter!("winrate_recalculations_total").increment(1);
    histogram!("winrate_recalculation_seconds").record(started.elapsed().as_secs_f64());
    tracing::debug!(
        setup_id = %setup_id,
        trades = total,
        winrate = ?winrate,
        "Setup winrate recalculated"
    );

    Ok(winrate)
}

/// Setups touched by moving a trade from `old` to `new`, in lock order.
fn affected_setups(old: Option<Uuid>, new: Option<Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = old.into_iter().chain(new).collect();
    ids.sort();
    ids.dedup();
    ids
}

async fn ensure_tags_owned(
    conn: &mut PgConnection,
    user_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), AppError> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let mut unique = tag_ids.to_vec();
    unique.sort();
    unique.dedup();

    let owned = tag_repo::count_owned_tags(&mut *conn, user_id, &unique).await?;
    if owned != unique.len() as i64 {
        return Err(AppError::BadRequest("unknown tag id".into()));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

pub async fn get_trade_detail(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<TradeDetail, AppError> {
    let trade = trade_repo::get_trade(pool, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;
    let tags = tag_repo::tags_for_trade(pool, trade.id).await?;

    Ok(TradeDetail { trade, tags })
}

pub async fn list_trade_details(
    pool: &PgPool,
    user_id: Uuid,
    filters: &TradeFilters,
) -> Result<Vec<TradeDetail>, AppError> {
    let trades = trade_repo::list_trades(pool, user_id, filters).await?;
    let ids: Vec<Uuid> = trades.iter().map(|t| t.id).collect();
    let mut tags = tag_repo::tags_for_trades(pool, &ids).await?;

    Ok(trades
        .into_iter()
        .map(|trade| {
            let tags = tags.remove(&trade.id).unwrap_or_default();
            TradeDetail { trade, tags }
        })
        .collect())
}
