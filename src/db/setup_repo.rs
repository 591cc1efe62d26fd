use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{SetupPerformance, SetupTrade, UpdateSetupInput};

// ---------------------------------------------------------------------------
// Setup CRUD
// ---------------------------------------------------------------------------

pub async fn create_setup(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    strategy: &str,
    notes: &str,
) -> anyhow::Result<SetupTrade> {
    let setup = sqlx::query_as::<_, SetupTrade>(
        r#"
        INSERT INTO setup_trades (user_id, name, strategy, notes)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(strategy)
    .bind(notes)
    .fetch_one(pool)
    .await?;

    Ok(setup)
}

pub async fn list_setups(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<SetupTrade>> {
    let setups = sqlx::query_as::<_, SetupTrade>(
        "SELECT * FROM setup_trades WHERE user_id = $1 ORDER BY name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(setups)
}

pub async fn get_setup<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<SetupTrade>> {
    let setup = sqlx::query_as::<_, SetupTrade>(
        "SELECT * FROM setup_trades WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(setup)
}

/// Update the user-editable columns. `winrate` is left untouched.
pub async fn update_setup(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &UpdateSetupInput,
) -> anyhow::Result<Option<SetupTrade>> {
    let setup = sqlx::query_as::<_, SetupTrade>(
        r#"
        UPDATE setup_trades
        SET name = COALESCE($3, name),
            strategy = COALESCE($4, strategy),
            notes = COALESCE($5, notes),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(input.name.as_deref())
    .bind(input.strategy.as_deref())
    .bind(input.notes.as_deref())
    .fetch_optional(pool)
    .await?;

    Ok(setup)
}

/// Delete a setup. Linked trades are unlinked by the foreign key.
pub async fn delete_setup<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM setup_trades WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Winrate maintenance
// ---------------------------------------------------------------------------

/// Take the row lock that serializes winrate recalculation for a setup.
/// Returns false when the setup does not exist for this user.
pub async fn lock_setup<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<bool> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM setup_trades WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.is_some())
}

pub async fn set_winrate<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    winrate: Option<Decimal>,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE setup_trades SET winrate = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(winrate)
        .execute(executor)
        .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

pub async fn setup_performance(
    pool: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<Vec<SetupPerformance>> {
    let rows = sqlx::query_as::<_, SetupPerformance>(
        r#"
        SELECT s.id,
               s.name,
               s.winrate,
               COUNT(t.id) AS trade_count,
               COUNT(t.id) FILTER (WHERE t.outcome = 'win') AS win_count,
               COALESCE(SUM(t.profit_loss), 0) AS total_profit_loss
        FROM setup_trades s
        LEFT JOIN trades t ON t.setup_trade_id = s.id AND t.user_id = s.user_id
        WHERE s.user_id = $1
        GROUP BY s.id, s.name, s.winrate
        ORDER BY s.name
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
