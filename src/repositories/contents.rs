use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::Content;
use crate::db::types::ContentType;

const COLUMNS: &str = "\
    id, subject_id, title, content_type, video_url, description, \
    is_published, is_active, created_at, updated_at";

pub(crate) struct CreateContent<'a> {
    pub(crate) id: &'a str,
    pub(crate) subject_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) content_type: ContentType,
    pub(crate) video_url: &'a str,
    pub(crate) description: &'a str,
    pub(crate) is_published: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateContent<'_>,
) -> Result<Content, sqlx::Error> {
    sqlx::query_as::<_, Content>(&format!(
        "INSERT INTO contents (
            id, subject_id, title, content_type, video_url, description,
            is_published, is_active, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,TRUE,$8,$8)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.subject_id)
    .bind(params.title)
    .bind(params.content_type)
    .bind(params.video_url)
    .bind(params.description)
    .bind(params.is_published)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Content>, sqlx::Error> {
    sqlx::query_as::<_, Content>(&format!("SELECT {COLUMNS} FROM contents WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_published(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Content>, sqlx::Error> {
    sqlx::query_as::<_, Content>(&format!(
        "SELECT {COLUMNS} FROM contents
         WHERE id = $1 AND is_published = TRUE AND is_active = TRUE"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Published contents of one subject, newest first.
pub(crate) async fn list_published_by_subject(
    pool: &PgPool,
    subject_id: &str,
    content_type: Option<ContentType>,
) -> Result<Vec<Content>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {COLUMNS} FROM contents WHERE is_published = TRUE AND is_active = TRUE AND subject_id = "
    ));
    builder.push_bind(subject_id);

    if let Some(content_type) = content_type {
        builder.push(" AND content_type = ");
        builder.push_bind(content_type);
    }

    builder.push(" ORDER BY created_at DESC, id");

    builder.build_query_as::<Content>().fetch_all(pool).await
}

pub(crate) async fn count_published(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM contents WHERE is_published = TRUE AND is_active = TRUE",
    )
    .fetch_one(pool)
    .await
}
