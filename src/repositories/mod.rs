pub(crate) mod auth_sessions;
pub(crate) mod class_levels;
pub(crate) mod comments;
pub(crate) mod contents;
pub(crate) mod health;
pub(crate) mod levels;
pub(crate) mod subjects;
pub(crate) mod users;
pub(crate) mod videos;
