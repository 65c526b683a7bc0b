use sqlx::PgPool;

use crate::db::models::ClassLevel;

const COLUMNS: &str = "id, level_id, name, is_active, created_at, updated_at";

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    level_id: &str,
    name: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<ClassLevel, sqlx::Error> {
    sqlx::query_as::<_, ClassLevel>(&format!(
        "INSERT INTO class_levels (id, level_id, name, is_active, created_at, updated_at)
         VALUES ($1,$2,$3,TRUE,$4,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(level_id)
    .bind(name)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<ClassLevel>, sqlx::Error> {
    sqlx::query_as::<_, ClassLevel>(&format!("SELECT {COLUMNS} FROM class_levels WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_active_by_levels(
    pool: &PgPool,
    level_ids: &[String],
) -> Result<Vec<ClassLevel>, sqlx::Error> {
    sqlx::query_as::<_, ClassLevel>(&format!(
        "SELECT {COLUMNS} FROM class_levels
         WHERE level_id = ANY($1) AND is_active = TRUE
         ORDER BY name"
    ))
    .bind(level_ids)
    .fetch_all(pool)
    .await
}
