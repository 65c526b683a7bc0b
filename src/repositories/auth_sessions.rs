use sqlx::PgPool;

use crate::db::models::AuthSession;

const COLUMNS: &str = "id, user_id, created_at, expires_at, revoked_at";

pub(crate) struct CreateAuthSession<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) expires_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAuthSession<'_>,
) -> Result<AuthSession, sqlx::Error> {
    sqlx::query_as::<_, AuthSession>(&format!(
        "INSERT INTO auth_sessions (id, user_id, created_at, expires_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.created_at)
    .bind(params.expires_at)
    .fetch_one(executor)
    .await
}

/// A session is usable while it belongs to `user_id`, is not revoked and has not expired.
pub(crate) async fn find_active(
    pool: &PgPool,
    id: &str,
    user_id: &str,
    now: time::PrimitiveDateTime,
) -> Result<Option<AuthSession>, sqlx::Error> {
    sqlx::query_as::<_, AuthSession>(&format!(
        "SELECT {COLUMNS} FROM auth_sessions
         WHERE id = $1 AND user_id = $2 AND revoked_at IS NULL AND expires_at > $3"
    ))
    .bind(id)
    .bind(user_id)
    .bind(now)
    .fetch_optional(pool)
    .await
}

/// Returns whether a live session was revoked by this call.
pub(crate) async fn revoke(
    pool: &PgPool,
    id: &str,
    at: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE auth_sessions SET revoked_at = $1 WHERE id = $2 AND revoked_at IS NULL",
    )
    .bind(at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
