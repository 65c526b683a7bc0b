use sqlx::PgPool;

use crate::db::models::Level;

const COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

pub(crate) struct CreateLevel<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) description: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateLevel<'_>) -> Result<Level, sqlx::Error> {
    sqlx::query_as::<_, Level>(&format!(
        "INSERT INTO levels (id, name, description, is_active, created_at, updated_at)
         VALUES ($1,$2,$3,TRUE,$4,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Level>, sqlx::Error> {
    sqlx::query_as::<_, Level>(&format!("SELECT {COLUMNS} FROM levels WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_active(pool: &PgPool) -> Result<Vec<Level>, sqlx::Error> {
    sqlx::query_as::<_, Level>(&format!(
        "SELECT {COLUMNS} FROM levels WHERE is_active = TRUE ORDER BY name"
    ))
    .fetch_all(pool)
    .await
}

/// Children go with the level through the cascading foreign keys.
pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM levels WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
