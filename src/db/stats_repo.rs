use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Raw aggregates over all of a user's trades.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TradeAggregates {
    pub total_trades: i64,
    pub win_count: i64,
    pub loss_count: i64,
    pub break_even_count: i64,
    pub total_profit_loss: Decimal,
    pub avg_risk_ratio: Option<Decimal>,
    pub best_trade: Option<Decimal>,
    pub worst_trade: Option<Decimal>,
}

pub async fn trade_aggregates(pool: &PgPool, user_id: Uuid) -> anyhow::Result<TradeAggregates> {
    let row = sqlx::query_as::<_, TradeAggregates>(
        r#"
        SELECT COUNT(*) AS total_trades,
               COUNT(*) FILTER (WHERE outcome = 'win') AS win_count,
               COUNT(*) FILTER (WHERE outcome = 'loss') AS loss_count,
               COUNT(*) FILTER (WHERE outcome = 'break-even') AS break_even_count,
               COALESCE(SUM(profit_loss), 0) AS total_profit_loss,
               AVG(risk_ratio) FILTER (WHERE risk_ratio > 0) AS avg_risk_ratio,
               MAX(profit_loss) AS best_trade,
               MIN(profit_loss) AS worst_trade
        FROM trades
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
