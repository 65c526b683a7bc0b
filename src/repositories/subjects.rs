use sqlx::PgPool;

use crate::db::models::Subject;

const COLUMNS: &str = "id, class_level_id, name, is_active, created_at, updated_at";

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    class_level_id: &str,
    name: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<Subject, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!(
        "INSERT INTO subjects (id, class_level_id, name, is_active, created_at, updated_at)
         VALUES ($1,$2,$3,TRUE,$4,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(class_level_id)
    .bind(name)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!("SELECT {COLUMNS} FROM subjects WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_active_by_classes(
    pool: &PgPool,
    class_level_ids: &[String],
) -> Result<Vec<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!(
        "SELECT {COLUMNS} FROM subjects
         WHERE class_level_id = ANY($1) AND is_active = TRUE
         ORDER BY name"
    ))
    .bind(class_level_ids)
    .fetch_all(pool)
    .await
}
