use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::db::models::User;
use crate::db::types::UserRole;

const COLUMNS: &str = "\
    id, email, hashed_password, first_name, last_name, phone, role, \
    is_active, is_staff, is_superuser, last_login, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// True when `email` belongs to any user other than `user_id`.
pub(crate) async fn email_taken_by_other(
    pool: &PgPool,
    email: &str,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
    )
    .bind(email)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub(crate) struct CreateUser<'a> {
    pub(crate) id: &'a str,
    pub(crate) email: &'a str,
    pub(crate) hashed_password: String,
    pub(crate) first_name: &'a str,
    pub(crate) last_name: &'a str,
    pub(crate) phone: &'a str,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) is_staff: bool,
    pub(crate) is_superuser: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl PgExecutor<'_>,
    params: CreateUser<'_>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            id, email, hashed_password, first_name, last_name, phone, role,
            is_active, is_staff, is_superuser, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.email)
    .bind(params.hashed_password)
    .bind(params.first_name)
    .bind(params.last_name)
    .bind(params.phone)
    .bind(params.role)
    .bind(params.is_active)
    .bind(params.is_staff)
    .bind(params.is_superuser)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

/// Full profile replacement. `hashed_password: None` keeps the stored credential.
pub(crate) struct UpdateUser<'a> {
    pub(crate) email: &'a str,
    pub(crate) first_name: &'a str,
    pub(crate) last_name: &'a str,
    pub(crate) phone: &'a str,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) is_staff: bool,
    pub(crate) hashed_password: Option<String>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateUser<'_>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET
            email = $1,
            first_name = $2,
            last_name = $3,
            phone = $4,
            role = $5,
            is_active = $6,
            is_staff = $7 OR is_superuser,
            hashed_password = COALESCE($8, hashed_password),
            updated_at = $9
         WHERE id = $10
         RETURNING {COLUMNS}",
    ))
    .bind(params.email)
    .bind(params.first_name)
    .bind(params.last_name)
    .bind(params.phone)
    .bind(params.role)
    .bind(params.is_active)
    .bind(params.is_staff)
    .bind(params.hashed_password)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn touch_last_login(
    pool: &PgPool,
    id: &str,
    at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Newest registrations first, optionally restricted to one role.
pub(crate) async fn list(pool: &PgPool, role: Option<UserRole>) -> Result<Vec<User>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM users"));

    if let Some(role) = role {
        builder.push(" WHERE role = ");
        builder.push_bind(role);
    }

    builder.push(" ORDER BY created_at DESC, id");

    builder.build_query_as::<User>().fetch_all(pool).await
}

pub(crate) async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_active = TRUE")
        .fetch_one(pool)
        .await
}

/// Active users grouped by role. Roles nobody holds are absent from the result.
pub(crate) async fn count_active_by_role(
    pool: &PgPool,
) -> Result<Vec<(UserRole, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (UserRole, i64)>(
        "SELECT role, COUNT(*) FROM users WHERE is_active = TRUE GROUP BY role",
    )
    .fetch_all(pool)
    .await
}
