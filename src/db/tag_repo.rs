use std::collections::HashMap;

use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{Tag, TagKind};

pub async fn create_tag(
    pool: &PgPool,
    user_id: Uuid,
    kind: TagKind,
    name: &str,
) -> anyhow::Result<Tag> {
    let tag = sqlx::query_as::<_, Tag>(
        "INSERT INTO tags (user_id, kind, name) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user_id)
    .bind(kind)
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(tag)
}

pub async fn list_tags(
    pool: &PgPool,
    user_id: Uuid,
    kind: Option<TagKind>,
) -> anyhow::Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT * FROM tags
        WHERE user_id = $1 AND ($2::tag_kind IS NULL OR kind = $2)
        ORDER BY kind, name
        "#,
    )
    .bind(user_id)
    .bind(kind)
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

pub async fn delete_tag(pool: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// How many of `ids` are tags owned by the user.
pub async fn count_owned_tags<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    ids: &[Uuid],
) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM tags WHERE user_id = $1 AND id = ANY($2)",
    )
    .bind(user_id)
    .bind(ids)
    .fetch_one(executor)
    .await?;

    Ok(row.0)
}

/// Replace the full tag set of a trade.
pub async fn replace_trade_tags(
    conn: &mut PgConnection,
    trade_id: Uuid,
    tag_ids: &[Uuid],
) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM trade_tags WHERE trade_id = $1")
        .bind(trade_id)
        .execute(&mut *conn)
        .await?;

    if !tag_ids.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO trade_tags (trade_id, tag_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(trade_id)
        .bind(tag_ids)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn tags_for_trade<'e>(
    executor: impl PgExecutor<'e>,
    trade_id: Uuid,
) -> anyhow::Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.* FROM tags t
        INNER JOIN trade_tags tt ON tt.tag_id = t.id
        WHERE tt.trade_id = $1
        ORDER BY t.kind, t.name
        "#,
    )
    .bind(trade_id)
    .fetch_all(executor)
    .await?;

    Ok(tags)
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct TradeTagRow {
    trade_id: Uuid,
    #[sqlx(flatten)]
    tag: Tag,
}

/// Tags for a batch of trades, keyed by trade id.
pub async fn tags_for_trades(
    pool: &PgPool,
    trade_ids: &[Uuid],
) -> anyhow::Result<HashMap<Uuid, Vec<Tag>>> {
    if trade_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, TradeTagRow>(
        r#"
        SELECT tt.trade_id, t.* FROM tags t
        INNER JOIN trade_tags tt ON tt.tag_id = t.id
        WHERE tt.trade_id = ANY($1)
        ORDER BY t.kind, t.name
        "#,
    )
    .bind(trade_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for row in rows {
        grouped.entry(row.trade_id).or_default().push(row.tag);
    }

    Ok(grouped)
}
