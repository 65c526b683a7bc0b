use sqlx::PgPool;

/// True once the users table exists, i.e. migrations have been applied.
pub(crate) async fn schema_ready(pool: &PgPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT to_regclass('public.users') IS NOT NULL")
        .fetch_one(pool)
        .await
}
