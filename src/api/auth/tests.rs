use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::registration_errors;
use crate::db::types::UserRole;
use crate::schemas::auth::RegisterRequest;
use crate::test_support;

async fn user_count(pool: &sqlx::PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(pool).await.expect("count users")
}

fn field_list(body: &serde_json::Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .map(|error| error["field"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn empty_registration_reports_rules_in_order() {
    let errors = registration_errors(&RegisterRequest::default());
    let fields = match errors.finish(json!({})) {
        Err(crate::api::errors::ApiError::Validation { errors, .. }) => {
            errors.into_iter().map(|error| error.field).collect::<Vec<_>>()
        }
        other => panic!("expected validation error, got {other:?}"),
    };
    assert_eq!(fields, vec!["first_name", "last_name", "email", "password"]);
}

#[test]
fn mismatched_short_password_reports_both_rules() {
    let payload = RegisterRequest {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        password: Some("short".to_string()),
        password_confirm: Some("shorter".to_string()),
        ..RegisterRequest::default()
    };

    let errors = registration_errors(&payload);
    assert!(errors.has("password_confirm"));
    assert!(errors.has("password"));
    assert!(!errors.has("email"));
}

#[tokio::test]
async fn registration_creates_student_with_session() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "first_name": " Ada ",
                "last_name": "Lovelace",
                "email": "Ada@Example.com",
                "phone": "+237 600 000 000",
                "password": "analytical-engine",
                "password_confirm": "analytical-engine"
            })),
        ))
        .await
        .expect("register");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["first_name"], "Ada");
    assert_eq!(body["user"]["role"], "student");
    assert_eq!(body["user"]["is_staff"], false);
    assert_eq!(body["redirect_to"], "/");
    assert!(body["notice"].is_string());
    assert_eq!(user_count(ctx.state.db()).await, 1);

    let token = body["access_token"].as_str().expect("token").to_string();
    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/me", Some(&token), None))
        .await
        .expect("me");
    assert_eq!(response.status(), StatusCode::OK);
    let me = test_support::read_json(response).await;
    assert_eq!(me["email"], "ada@example.com");
}

#[tokio::test]
async fn registration_with_taken_email_creates_nothing() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    test_support::insert_user(ctx.state.db(), "taken@example.com", UserRole::Student, "password1")
        .await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "first_name": "Other",
                "last_name": "Person",
                "email": "TAKEN@example.com",
                "password": "password1",
                "password_confirm": "password1"
            })),
        ))
        .await
        .expect("register");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert_eq!(field_list(&body), vec!["email"]);
    assert_eq!(body["errors"][0]["message"], "This email is already in use.");
    assert_eq!(body["submitted"]["first_name"], "Other");
    assert!(body["submitted"].get("password").is_none());
    assert_eq!(user_count(ctx.state.db()).await, 1);
}

#[tokio::test]
async fn registration_without_password_is_a_validation_error() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/register",
            None,
            Some(json!({ "first_name": "No", "last_name": "Password", "email": "np@example.com" })),
        ))
        .await
        .expect("register");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert_eq!(field_list(&body), vec!["password"]);
    assert_eq!(user_count(ctx.state.db()).await, 0);
}

#[tokio::test]
async fn concurrent_registrations_with_one_email_yield_one_account() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let payload = json!({
        "first_name": "Twin",
        "last_name": "Request",
        "email": "twin@example.com",
        "password": "same-password",
        "password_confirm": "same-password"
    });

    let first = ctx.app.clone().oneshot(test_support::json_request(
        Method::POST,
        "/register",
        None,
        Some(payload.clone()),
    ));
    let second = ctx.app.clone().oneshot(test_support::json_request(
        Method::POST,
        "/register",
        None,
        Some(payload),
    ));
    let (first, second) = tokio::join!(first, second);

    let mut statuses = vec![first.expect("first").status(), second.expect("second").status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    assert_eq!(user_count(ctx.state.db()).await, 1);
}

#[tokio::test]
async fn login_redirects_by_role() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    test_support::insert_user(ctx.state.db(), "staff@example.com", UserRole::Staff, "staff-pass")
        .await;
    test_support::insert_user(ctx.state.db(), "pupil@example.com", UserRole::Student, "pupil-pass")
        .await;

    for (email, password, expected) in [
        ("staff@example.com", "staff-pass", "/admin"),
        ("Pupil@Example.com", "pupil-pass", "/"),
    ] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/login",
                None,
                Some(json!({ "email": email, "password": password })),
            ))
            .await
            .expect("login");

        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {body}");
        assert_eq!(body["redirect_to"], expected);
        assert!(body["user"]["last_login"].is_string());
    }
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_inactive_accounts() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let user = test_support::insert_user(
        ctx.state.db(),
        "sleepy@example.com",
        UserRole::Teacher,
        "teacher-pass",
    )
    .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "sleepy@example.com", "password": "wrong-pass" })),
        ))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    test_support::deactivate_user(ctx.state.db(), &user.id).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "sleepy@example.com", "password": "teacher-pass" })),
        ))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_revokes_session() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let user =
        test_support::insert_user(ctx.state.db(), "leaver@example.com", UserRole::Student, "pass-1234")
            .await;
    let token = test_support::bearer_token(ctx.state.db(), &user.id, ctx.state.settings()).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/login", Some(&token), None))
        .await
        .expect("login page");
    let body = test_support::read_json(response).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["redirect_to"], "/");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::POST, "/logout", Some(&token), None))
        .await
        .expect("logout");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["redirect_to"], "/login");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/me", Some(&token), None))
        .await
        .expect("me");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/logout", None, None))
        .await
        .expect("anonymous logout");
    assert_eq!(response.status(), StatusCode::OK);
}
