use sqlx::PgPool;

use crate::db::models::Comment;

const COLUMNS: &str = "\
    id, content_id, author_name, message, is_approved, is_active, created_at, updated_at";

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    content_id: &str,
    author_name: &str,
    message: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        "INSERT INTO comments (
            id, content_id, author_name, message, is_approved, is_active, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,FALSE,TRUE,$5,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(content_id)
    .bind(author_name)
    .bind(message)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_approved_for_content(
    pool: &PgPool,
    content_id: &str,
) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        "SELECT {COLUMNS} FROM comments
         WHERE content_id = $1 AND is_approved = TRUE AND is_active = TRUE
         ORDER BY created_at DESC, id"
    ))
    .bind(content_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_approval(
    pool: &PgPool,
    approved: bool,
) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        "SELECT {COLUMNS} FROM comments
         WHERE is_approved = $1 AND is_active = TRUE
         ORDER BY created_at DESC, id"
    ))
    .bind(approved)
    .fetch_all(pool)
    .await
}

pub(crate) async fn approve(
    pool: &PgPool,
    id: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        "UPDATE comments SET is_approved = TRUE, updated_at = $1
         WHERE id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}
