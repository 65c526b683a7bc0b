use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::api::validation::FieldError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    submitted: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn plain(status: StatusCode, detail: String) -> Self {
        Self { status: status.as_u16(), detail, errors: None, submitted: None }
    }
}

#[derive(Debug)]
pub(crate) enum ApiError {
    /// Field-level form errors in the order they were found, echoed with the submitted values.
    Validation { errors: Vec<FieldError>, submitted: serde_json::Value },
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    TooManyRequests(&'static str),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    /// Validation failure on a single field.
    pub(crate) fn field(field: &str, message: &str, submitted: serde_json::Value) -> Self {
        Self::Validation { errors: vec![FieldError::new(field, message)], submitted }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { errors, submitted } => {
                let status = StatusCode::BAD_REQUEST;
                let body = ErrorResponse {
                    status: status.as_u16(),
                    detail: "Please correct the errors below.".to_string(),
                    errors: Some(errors),
                    submitted: Some(submitted),
                };
                (status, Json(body)).into_response()
            }
            ApiError::Unauthorized(message) => {
                let status = StatusCode::UNAUTHORIZED;
                let mut response =
                    (status, Json(ErrorResponse::plain(status, message.to_string())))
                        .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::Forbidden(message) => {
                let status = StatusCode::FORBIDDEN;
                (status, Json(ErrorResponse::plain(status, message.to_string()))).into_response()
            }
            ApiError::BadRequest(message) => {
                let status = StatusCode::BAD_REQUEST;
                (status, Json(ErrorResponse::plain(status, message))).into_response()
            }
            ApiError::NotFound(message) => {
                let status = StatusCode::NOT_FOUND;
                (status, Json(ErrorResponse::plain(status, message))).into_response()
            }
            ApiError::Conflict(message) => {
                let status = StatusCode::CONFLICT;
                (status, Json(ErrorResponse::plain(status, message))).into_response()
            }
            ApiError::TooManyRequests(message) => {
                let status = StatusCode::TOO_MANY_REQUESTS;
                (status, Json(ErrorResponse::plain(status, message.to_string()))).into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (status, Json(ErrorResponse::plain(status, message))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::read_json;

    #[tokio::test]
    async fn validation_error_lists_fields_in_order() {
        let error = ApiError::Validation {
            errors: vec![
                FieldError::new("first_name", "First name is required."),
                FieldError::new("password", "Passwords do not match."),
            ],
            submitted: serde_json::json!({ "email": "a@b.c" }),
        };

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_json(response).await;
        assert_eq!(body["errors"][0]["field"], "first_name");
        assert_eq!(body["errors"][1]["message"], "Passwords do not match.");
        assert_eq!(body["submitted"]["email"], "a@b.c");
    }

    #[tokio::test]
    async fn unauthorized_carries_bearer_challenge() {
        let response = ApiError::Unauthorized("Authentication required").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let body = read_json(response).await;
        assert!(body.get("errors").is_none());
    }
}
