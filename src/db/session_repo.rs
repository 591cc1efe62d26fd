use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CurrentUser, Session};

#[derive(Debug, Clone, sqlx::FromRow)]
struct SessionUserRow {
    session_id: Uuid,
    user_id: Uuid,
    username: String,
}

pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> anyhow::Result<Session> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (user_id, token_hash, expires_at)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(session)
}

/// Resolve an unexpired session by token hash to its user.
pub async fn find_active_session(
    pool: &PgPool,
    token_hash: &str,
) -> anyhow::Result<Option<CurrentUser>> {
    let row = sqlx::query_as::<_, SessionUserRow>(
        r#"
        SELECT s.id AS session_id, u.id AS user_id, u.username
        FROM sessions s
        INNER JOIN users u ON u.id = s.user_id
        WHERE s.token_hash = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| CurrentUser {
        id: r.user_id,
        username: r.username,
        session_id: r.session_id,
    }))
}

pub async fn delete_session(pool: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove a user's expired sessions. Returns the number deleted.
pub async fn delete_expired_sessions(pool: &PgPool, user_id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND expires_at <= NOW()")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
