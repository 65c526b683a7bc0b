use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStaff;
use crate::api::validation::FormErrors;
use crate::core::{state::AppState, time::primitive_now_utc};
use crate::db::models::{ClassLevel, Subject};
use crate::repositories;
use crate::schemas::catalog::{
    ClassLevelCreate, ClassLevelNode, CommentCreate, CommentQueueQuery, CommentResponse,
    CommentSubmitted, ContentCreate, ContentDetailResponse, ContentListQuery, ContentResponse,
    LevelCreate, LevelNode, LevelResponse, NamedNode, SubjectCreate, SubjectNode, VideoResponse,
    VideoUpsert,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/catalog/levels", get(level_tree))
        .route("/catalog/subjects/:subject_id/contents", get(list_subject_contents))
        .route("/catalog/contents/:content_id", get(content_detail))
        .route("/catalog/contents/:content_id/comments", post(submit_comment))
        .route("/admin/catalog/levels", post(create_level))
        .route("/admin/catalog/levels/:level_id", delete(delete_level))
        .route("/admin/catalog/levels/:level_id/classes", post(create_class_level))
        .route("/admin/catalog/classes/:class_id/subjects", post(create_subject))
        .route("/admin/catalog/subjects/:subject_id/contents", post(create_content))
        .route("/admin/catalog/contents/:content_id/video", put(upsert_video))
        .route("/admin/comments", get(comment_queue))
        .route("/admin/comments/:comment_id/approve", post(approve_comment))
}

/// Maps a failed insert: unique violations are duplicates within the parent,
/// foreign-key violations mean the parent vanished between lookup and insert.
fn insert_error(err: sqlx::Error, duplicate: &str, context: &str) -> ApiError {
    if crate::db::is_unique_violation(&err) {
        ApiError::Conflict(duplicate.to_string())
    } else if crate::db::is_foreign_key_violation(&err) {
        ApiError::NotFound("Parent not found".to_string())
    } else {
        ApiError::internal(err, context)
    }
}

async fn level_tree(State(state): State<AppState>) -> Result<Json<Vec<LevelNode>>, ApiError> {
    let levels = repositories::levels::list_active(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list levels"))?;
    let level_ids: Vec<String> = levels.iter().map(|level| level.id.clone()).collect();

    let classes = repositories::class_levels::list_active_by_levels(state.db(), &level_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list class levels"))?;
    let class_ids: Vec<String> = classes.iter().map(|class| class.id.clone()).collect();

    let subjects = repositories::subjects::list_active_by_classes(state.db(), &class_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list subjects"))?;

    Ok(Json(build_tree(levels, classes, subjects)))
}

fn build_tree(
    levels: Vec<crate::db::models::Level>,
    classes: Vec<ClassLevel>,
    subjects: Vec<Subject>,
) -> Vec<LevelNode> {
    let mut subjects_by_class: HashMap<String, Vec<SubjectNode>> = HashMap::new();
    for subject in subjects {
        subjects_by_class
            .entry(subject.class_level_id)
            .or_default()
            .push(SubjectNode { id: subject.id, name: subject.name });
    }

    let mut classes_by_level: HashMap<String, Vec<ClassLevelNode>> = HashMap::new();
    for class in classes {
        let subjects = subjects_by_class.remove(&class.id).unwrap_or_default();
        classes_by_level.entry(class.level_id).or_default().push(ClassLevelNode {
            id: class.id,
            name: class.name,
            subjects,
        });
    }

    levels
        .into_iter()
        .map(|level| LevelNode {
            classes: classes_by_level.remove(&level.id).unwrap_or_default(),
            id: level.id,
            name: level.name,
            description: level.description,
        })
        .collect()
}

async fn list_subject_contents(
    Path(subject_id): Path<String>,
    Query(params): Query<ContentListQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentResponse>>, ApiError> {
    let subject = repositories::subjects::find_by_id(state.db(), &subject_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch subject"))?;
    if !subject.is_some_and(|subject| subject.is_active) {
        return Err(ApiError::NotFound("Subject not found".to_string()));
    }

    let contents =
        repositories::contents::list_published_by_subject(state.db(), &subject_id, params.content_type)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list contents"))?;

    Ok(Json(contents.into_iter().map(ContentResponse::from_db).collect()))
}

async fn content_detail(
    Path(content_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ContentDetailResponse>, ApiError> {
    let content = repositories::contents::find_published(state.db(), &content_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch content"))?
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))?;

    let video = repositories::videos::find_published_for_content(state.db(), &content.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch video"))?;

    let comments = repositories::comments::list_approved_for_content(state.db(), &content.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list comments"))?;

    Ok(Json(ContentDetailResponse {
        content: ContentResponse::from_db(content),
        video: video.map(VideoResponse::from_db),
        comments: comments.into_iter().map(CommentResponse::from_db).collect(),
    }))
}

async fn submit_comment(
    Path(content_id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<CommentCreate>,
) -> Result<(StatusCode, Json<CommentSubmitted>), ApiError> {
    let author_name = payload.author_name.trim();
    let message = payload.message.trim();

    let mut errors = FormErrors::new();
    if author_name.is_empty() {
        errors.add("author_name", "This field is required.");
    } else if author_name.chars().count() > 100 {
        errors.add("author_name", "Ensure this value has at most 100 characters.");
    }
    if message.is_empty() {
        errors.add("message", "This field is required.");
    }
    errors.finish(serde_json::json!({ "author_name": author_name, "message": message }))?;

    let content = repositories::contents::find_published(state.db(), &content_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch content"))?
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))?;

    let comment = repositories::comments::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &content.id,
        author_name,
        message,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| insert_error(e, "Duplicate comment", "Failed to store comment"))?;

    tracing::info!(content_id = %content.id, comment_id = %comment.id, "Comment awaiting moderation");

    Ok((
        StatusCode::CREATED,
        Json(CommentSubmitted {
            comment: CommentResponse::from_db(comment),
            notice: "Thank you! Your comment will be visible once approved.",
        }),
    ))
}

async fn create_level(
    CurrentStaff(admin): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<LevelCreate>,
) -> Result<(StatusCode, Json<LevelResponse>), ApiError> {
    let payload = payload.trimmed();
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let level = repositories::levels::create(
        state.db(),
        repositories::levels::CreateLevel {
            id: &Uuid::new_v4().to_string(),
            name: &payload.name,
            description: &payload.description,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| insert_error(e, "Level with this name already exists", "Failed to create level"))?;

    tracing::info!(admin_id = %admin.id, level_id = %level.id, action = "create_level", "Level created");
    Ok((StatusCode::CREATED, Json(LevelResponse::from_db(level))))
}

async fn delete_level(
    Path(level_id): Path<String>,
    CurrentStaff(admin): CurrentStaff,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::levels::delete(state.db(), &level_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete level"))?;

    if !deleted {
        return Err(ApiError::NotFound("Level not found".to_string()));
    }

    tracing::info!(admin_id = %admin.id, level_id = %level_id, action = "delete_level", "Level deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn create_class_level(
    Path(level_id): Path<String>,
    CurrentStaff(admin): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<ClassLevelCreate>,
) -> Result<(StatusCode, Json<NamedNode>), ApiError> {
    let payload = payload.trimmed();
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    repositories::levels::find_by_id(state.db(), &level_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch level"))?
        .ok_or_else(|| ApiError::NotFound("Level not found".to_string()))?;

    let class = repositories::class_levels::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &level_id,
        &payload.name,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| {
        insert_error(e, "Class with this name already exists in the level", "Failed to create class")
    })?;

    tracing::info!(admin_id = %admin.id, class_id = %class.id, action = "create_class", "Class created");
    Ok((StatusCode::CREATED, Json(NamedNode::from_class(class))))
}

async fn create_subject(
    Path(class_id): Path<String>,
    CurrentStaff(admin): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<SubjectCreate>,
) -> Result<(StatusCode, Json<NamedNode>), ApiError> {
    let payload = payload.trimmed();
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    repositories::class_levels::find_by_id(state.db(), &class_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch class"))?
        .ok_or_else(|| ApiError::NotFound("Class not found".to_string()))?;

    let subject = repositories::subjects::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &class_id,
        &payload.name,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| {
        insert_error(e, "Subject with this name already exists in the class", "Failed to create subject")
    })?;

    tracing::info!(
        admin_id = %admin.id,
        subject_id = %subject.id,
        action = "create_subject",
        "Subject created"
    );
    Ok((StatusCode::CREATED, Json(NamedNode::from_subject(subject))))
}

async fn create_content(
    Path(subject_id): Path<String>,
    CurrentStaff(admin): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<ContentCreate>,
) -> Result<(StatusCode, Json<ContentResponse>), ApiError> {
    let payload = payload.trimmed();
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    repositories::subjects::find_by_id(state.db(), &subject_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch subject"))?
        .ok_or_else(|| ApiError::NotFound("Subject not found".to_string()))?;

    let content = repositories::contents::create(
        state.db(),
        repositories::contents::CreateContent {
            id: &Uuid::new_v4().to_string(),
            subject_id: &subject_id,
            title: &payload.title,
            content_type: payload.content_type,
            video_url: &payload.video_url,
            description: &payload.description,
            is_published: payload.is_published,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| insert_error(e, "Duplicate content", "Failed to create content"))?;

    tracing::info!(
        admin_id = %admin.id,
        content_id = %content.id,
        action = "create_content",
        "Content created"
    );
    Ok((StatusCode::CREATED, Json(ContentResponse::from_db(content))))
}

async fn upsert_video(
    Path(content_id): Path<String>,
    CurrentStaff(admin): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<VideoUpsert>,
) -> Result<Json<VideoResponse>, ApiError> {
    let payload = payload.trimmed();
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let content = repositories::contents::find_by_id(state.db(), &content_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch content"))?
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))?;

    let video = repositories::videos::upsert_for_content(
        state.db(),
        repositories::videos::UpsertVideo {
            id: &Uuid::new_v4().to_string(),
            content_id: &content.id,
            title: &payload.title,
            description: &payload.description,
            video_url: &payload.video_url,
            is_published: payload.is_published,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| insert_error(e, "Video conflict", "Failed to store video"))?;

    tracing::info!(admin_id = %admin.id, content_id = %content.id, action = "upsert_video", "Video stored");
    Ok(Json(VideoResponse::from_db(video)))
}

async fn comment_queue(
    CurrentStaff(_admin): CurrentStaff,
    Query(params): Query<CommentQueueQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let comments = repositories::comments::list_by_approval(state.db(), params.approved)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list comments"))?;

    Ok(Json(comments.into_iter().map(CommentResponse::from_db).collect()))
}

async fn approve_comment(
    Path(comment_id): Path<String>,
    CurrentStaff(admin): CurrentStaff,
    State(state): State<AppState>,
) -> Result<Json<CommentResponse>, ApiError> {
    let comment = repositories::comments::approve(state.db(), &comment_id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to approve comment"))?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    tracing::info!(
        admin_id = %admin.id,
        comment_id = %comment.id,
        action = "approve_comment",
        "Comment approved"
    );
    Ok(Json(CommentResponse::from_db(comment)))
}
