use sqlx::PgPool;

use crate::db::models::Video;

const COLUMNS: &str = "\
    id, content_id, title, description, video_url, is_published, is_active, created_at, updated_at";

pub(crate) struct UpsertVideo<'a> {
    pub(crate) id: &'a str,
    pub(crate) content_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) video_url: &'a str,
    pub(crate) is_published: bool,
    pub(crate) now: time::PrimitiveDateTime,
}

/// One video per content: a second write replaces the first and keeps its id.
pub(crate) async fn upsert_for_content(
    pool: &PgPool,
    params: UpsertVideo<'_>,
) -> Result<Video, sqlx::Error> {
    sqlx::query_as::<_, Video>(&format!(
        "INSERT INTO videos (
            id, content_id, title, description, video_url, is_published, is_active,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,TRUE,$7,$7)
         ON CONFLICT (content_id)
         DO UPDATE SET title = EXCLUDED.title,
                       description = EXCLUDED.description,
                       video_url = EXCLUDED.video_url,
                       is_published = EXCLUDED.is_published,
                       updated_at = EXCLUDED.updated_at
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.content_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.video_url)
    .bind(params.is_published)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_published_for_content(
    pool: &PgPool,
    content_id: &str,
) -> Result<Option<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>(&format!(
        "SELECT {COLUMNS} FROM videos
         WHERE content_id = $1 AND is_published = TRUE AND is_active = TRUE"
    ))
    .bind(content_id)
    .fetch_optional(pool)
    .await
}
