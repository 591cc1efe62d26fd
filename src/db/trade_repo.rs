use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::journal::{DerivedFields, TradeInputs};
use crate::models::{Outcome, Trade, TradeFilters};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 500;

/// Column values written on insert and update. Derived fields always travel
/// with the inputs they were computed from.
#[derive(Debug, Clone)]
pub struct TradeWrite<'a> {
    pub setup_trade_id: Option<Uuid>,
    pub inputs: TradeInputs,
    pub derived: DerivedFields,
    pub trade_date: DateTime<Utc>,
    pub notes: Option<&'a str>,
    pub screenshot_url: Option<&'a str>,
}

pub async fn insert_trade<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    write: &TradeWrite<'_>,
) -> anyhow::Result<Trade> {
    let trade = sqlx::query_as::<_, Trade>(
        r#"
        INSERT INTO trades (
            user_id, setup_trade_id, direction, entry_price, take_profit, stoploss,
            exit_price, lot_size, outcome, profit_loss, risk_ratio, trade_date,
            notes, screenshot_url
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(write.setup_trade_id)
    .bind(write.inputs.direction)
    .bind(write.inputs.entry_price)
    .bind(write.inputs.take_profit)
    .bind(write.inputs.stoploss)
    .bind(write.inputs.exit_price)
    .bind(write.inputs.lot_size)
    .bind(write.derived.outcome)
    .bind(write.derived.profit_loss)
    .bind(write.derived.risk_ratio)
    .bind(write.trade_date)
    .bind(write.notes)
    .bind(write.screenshot_url)
    .fetch_one(executor)
    .await?;

    Ok(trade)
}

pub async fn update_trade<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    id: Uuid,
    write: &TradeWrite<'_>,
) -> anyhow::Result<Trade> {
    let trade = sqlx::query_as::<_, Trade>(
        r#"
        UPDATE trades
        SET setup_trade_id = $3,
            direction = $4,
            entry_price = $5,
            take_profit = $6,
            stoploss = $7,
            exit_price = $8,
            lot_size = $9,
            outcome = $10,
            profit_loss = $11,
            risk_ratio = $12,
            trade_date = $13,
            notes = $14,
            screenshot_url = $15,
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(write.setup_trade_id)
    .bind(write.inputs.direction)
    .bind(write.inputs.entry_price)
    .bind(write.inputs.take_profit)
    .bind(write.inputs.stoploss)
    .bind(write.inputs.exit_price)
    .bind(write.inputs.lot_size)
    .bind(write.derived.outcome)
    .bind(write.derived.profit_loss)
    .bind(write.derived.risk_ratio)
    .bind(write.trade_date)
    .bind(write.notes)
    .bind(write.screenshot_url)
    .fetch_one(executor)
    .await?;

    Ok(trade)
}

pub async fn get_trade<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<Trade>> {
    let trade = sqlx::query_as::<_, Trade>("SELECT * FROM trades WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

    Ok(trade)
}

/// Fetch a trade and hold its row lock until the transaction ends.
pub async fn lock_trade<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<Trade>> {
    let trade = sqlx::query_as::<_, Trade>(
        "SELECT * FROM trades WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(trade)
}

pub async fn delete_trade<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM trades WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// List a user's trades, newest first, with optional filters and paging.
pub async fn list_trades(
    pool: &PgPool,
    user_id: Uuid,
    filters: &TradeFilters,
) -> anyhow::Result<Vec<Trade>> {
    let limit = filters
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let page = filters.page.unwrap_or(1).max(1);
    let offset = (page - 1) * limit;

    let trades = sqlx::query_as::<_, Trade>(
        r#"
        SELECT * FROM trades
        WHERE user_id = $1
          AND ($2::uuid IS NULL OR setup_trade_id = $2)
          AND ($3::trade_outcome IS NULL OR outcome = $3)
          AND ($4::timestamptz IS NULL OR trade_date >= $4)
          AND ($5::timestamptz IS NULL OR trade_date <= $5)
        ORDER BY trade_date DESC, created_at DESC
        LIMIT $6 OFFSET $7
        "#,
    )
    .bind(user_id)
    .bind(filters.setup_id)
    .bind(filters.outcome)
    .bind(filters.from)
    .bind(filters.to)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(trades)
}

/// Outcomes of every trade the user has linked to a setup.
pub async fn outcomes_for_setup<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    setup_id: Uuid,
) -> anyhow::Result<Vec<Outcome>> {
    let rows: Vec<(Outcome,)> = sqlx::query_as(
        "SELECT outcome FROM trades WHERE setup_trade_id = $1 AND user_id = $2",
    )
    .bind(setup_id)
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}
