use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{ClassLevel, Comment, Content, Level, Subject, Video};
use crate::db::types::ContentType;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LevelCreate {
    #[validate(length(min = 1, max = 50, message = "name must contain 1..50 characters"))]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ClassLevelCreate {
    #[validate(length(min = 1, max = 50, message = "name must contain 1..50 characters"))]
    pub(crate) name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubjectCreate {
    #[validate(length(min = 1, max = 100, message = "name must contain 1..100 characters"))]
    pub(crate) name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ContentCreate {
    #[validate(length(min = 1, max = 200, message = "title must contain 1..200 characters"))]
    pub(crate) title: String,
    pub(crate) content_type: ContentType,
    #[validate(url(message = "video_url must be a valid URL"))]
    pub(crate) video_url: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default = "default_true")]
    pub(crate) is_published: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct VideoUpsert {
    #[validate(length(min = 1, max = 200, message = "title must contain 1..200 characters"))]
    pub(crate) title: String,
    #[validate(url(message = "video_url must be a valid URL"))]
    pub(crate) video_url: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default = "default_true")]
    pub(crate) is_published: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CommentCreate {
    pub(crate) author_name: String,
    pub(crate) message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentListQuery {
    pub(crate) content_type: Option<ContentType>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentQueueQuery {
    #[serde(default)]
    pub(crate) approved: bool,
}

impl LevelCreate {
    /// Surrounding whitespace is dropped before validation so blank names fail `length`.
    pub(crate) fn trimmed(self) -> Self {
        Self { name: self.name.trim().to_string(), description: self.description.trim().to_string() }
    }
}

impl ClassLevelCreate {
    pub(crate) fn trimmed(self) -> Self {
        Self { name: self.name.trim().to_string() }
    }
}

impl SubjectCreate {
    pub(crate) fn trimmed(self) -> Self {
        Self { name: self.name.trim().to_string() }
    }
}

impl ContentCreate {
    pub(crate) fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            video_url: self.video_url.trim().to_string(),
            description: self.description.trim().to_string(),
            ..self
        }
    }
}

impl VideoUpsert {
    pub(crate) fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            video_url: self.video_url.trim().to_string(),
            description: self.description.trim().to_string(),
            ..self
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub(crate) struct LevelResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) created_at: String,
}

impl LevelResponse {
    pub(crate) fn from_db(level: Level) -> Self {
        Self {
            id: level.id,
            name: level.name,
            description: level.description,
            created_at: format_primitive(level.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NamedNode {
    pub(crate) id: String,
    pub(crate) parent_id: String,
    pub(crate) name: String,
}

impl NamedNode {
    pub(crate) fn from_class(class: ClassLevel) -> Self {
        Self { id: class.id, parent_id: class.level_id, name: class.name }
    }

    pub(crate) fn from_subject(subject: Subject) -> Self {
        Self { id: subject.id, parent_id: subject.class_level_id, name: subject.name }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectNode {
    pub(crate) id: String,
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClassLevelNode {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) subjects: Vec<SubjectNode>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LevelNode {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) classes: Vec<ClassLevelNode>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContentResponse {
    pub(crate) id: String,
    pub(crate) subject_id: String,
    pub(crate) title: String,
    pub(crate) content_type: ContentType,
    pub(crate) content_type_label: &'static str,
    pub(crate) video_url: String,
    pub(crate) description: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: String,
}

impl ContentResponse {
    pub(crate) fn from_db(content: Content) -> Self {
        Self {
            content_type_label: content.content_type.label(),
            id: content.id,
            subject_id: content.subject_id,
            title: content.title,
            content_type: content.content_type,
            video_url: content.video_url,
            description: content.description,
            is_published: content.is_published,
            created_at: format_primitive(content.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct VideoResponse {
    pub(crate) id: String,
    pub(crate) content_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) video_url: String,
    pub(crate) is_published: bool,
}

impl VideoResponse {
    pub(crate) fn from_db(video: Video) -> Self {
        Self {
            id: video.id,
            content_id: video.content_id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            is_published: video.is_published,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentResponse {
    pub(crate) id: String,
    pub(crate) content_id: String,
    pub(crate) author_name: String,
    pub(crate) message: String,
    pub(crate) is_approved: bool,
    pub(crate) created_at: String,
}

impl CommentResponse {
    pub(crate) fn from_db(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content_id: comment.content_id,
            author_name: comment.author_name,
            message: comment.message,
            is_approved: comment.is_approved,
            created_at: format_primitive(comment.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ContentDetailResponse {
    pub(crate) content: ContentResponse,
    pub(crate) video: Option<VideoResponse>,
    pub(crate) comments: Vec<CommentResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentSubmitted {
    pub(crate) comment: CommentResponse,
    pub(crate) notice: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_fail_after_trimming() {
        let level = LevelCreate { name: "   ".to_string(), description: String::new() }.trimmed();
        assert!(level.validate().is_err());

        let class = ClassLevelCreate { name: "\t ".to_string() }.trimmed();
        assert!(class.validate().is_err());

        let subject = SubjectCreate { name: " History ".to_string() }.trimmed();
        assert!(subject.validate().is_ok());
        assert_eq!(subject.name, "History");
    }

    #[test]
    fn length_limit_ignores_surrounding_whitespace() {
        let padded = format!("  {}  ", "a".repeat(50));
        let level = LevelCreate { name: padded, description: String::new() }.trimmed();
        assert!(level.validate().is_ok());
    }

    #[test]
    fn blank_content_title_fails_and_flags_survive() {
        let content = ContentCreate {
            title: "  ".to_string(),
            content_type: ContentType::Exam,
            video_url: " https://video.example/a ".to_string(),
            description: String::new(),
            is_published: false,
        }
        .trimmed();

        assert_eq!(content.video_url, "https://video.example/a");
        assert!(!content.is_published);
        let errors = content.validate().expect_err("blank title");
        assert!(errors.field_errors().contains_key("title"));
    }
}
