use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentUser, MaybeUser};
use crate::api::validation::{
    normalize_email, password_long_enough, password_too_short_message, FormErrors,
};
use crate::core::{metrics, security, state::AppState, time::primitive_now_utc};
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::auth::{
    AuthResponse, LoginPageResponse, LoginRequest, LogoutResponse, RegisterPageResponse,
    RegisterRequest,
};
use crate::schemas::user::UserResponse;

/// Max attempts per window for login and registration, keyed by email.
const AUTH_RATE_LIMIT: u64 = 10;
const AUTH_RATE_WINDOW_SECONDS: u64 = 60;

const EMAIL_IN_USE: &str = "This email is already in use.";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout).post(logout))
        .route("/me", get(me))
}

async fn register_page() -> Json<RegisterPageResponse> {
    Json(RegisterPageResponse {
        template: "auth/register.html",
        fields: ["first_name", "last_name", "email", "phone", "password", "password_confirm"],
    })
}

/// Applies the signup rules in order and collects every failure.
/// The uniqueness rule runs later against the database.
pub(crate) fn registration_errors(payload: &RegisterRequest) -> FormErrors {
    let mut errors = FormErrors::new();

    if payload.first_name.trim().is_empty() {
        errors.add("first_name", "First name is required.");
    }
    if payload.last_name.trim().is_empty() {
        errors.add("last_name", "Last name is required.");
    }
    if payload.email.trim().is_empty() {
        errors.add("email", "Email is required.");
    }

    let password = payload.password.as_deref().unwrap_or("");
    if payload.password != payload.password_confirm {
        errors.add("password_confirm", "Passwords do not match.");
    }
    if !password_long_enough(password) {
        errors.add("password", password_too_short_message());
    }

    errors
}

fn registration_old(payload: &RegisterRequest) -> serde_json::Value {
    serde_json::json!({
        "first_name": payload.first_name.trim(),
        "last_name": payload.last_name.trim(),
        "email": payload.email.trim(),
        "phone": payload.phone.trim(),
    })
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let email = normalize_email(&payload.email);

    if !email.is_empty()
        && !state
            .redis()
            .allow("register", &email, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
            .await
    {
        metrics::record_auth_event("register", "throttled");
        return Err(ApiError::TooManyRequests("Too many registration attempts, try again later"));
    }

    let mut errors = registration_errors(&payload);

    if !email.is_empty() {
        let existing = repositories::users::exists_by_email(state.db(), &email)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
        if existing.is_some() {
            errors.add("email", EMAIL_IN_USE);
        }
    }

    if !errors.is_empty() {
        metrics::record_auth_event("register", "invalid");
    }
    errors.finish(registration_old(&payload))?;

    let password = payload.password.as_deref().unwrap_or("");
    let hashed_password = security::hash_password(password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let now = primitive_now_utc();

    let created = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email: &email,
            hashed_password,
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
            phone: payload.phone.trim(),
            role: UserRole::Student,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: now,
            updated_at: now,
        },
    )
    .await;

    let user = match created {
        Ok(user) => user,
        Err(err) if crate::db::is_unique_violation(&err) => {
            metrics::record_auth_event("register", "duplicate");
            return Err(ApiError::field("email", EMAIL_IN_USE, registration_old(&payload)));
        }
        Err(err) => return Err(ApiError::internal(err, "Failed to create user")),
    };

    let access_token = open_session(&state, &user).await?;
    tracing::info!(user_id = %user.id, action = "register", "User registered");
    metrics::record_auth_event("register", "success");

    let response = AuthResponse {
        access_token,
        token_type: "bearer",
        redirect_to: state.settings().api().home_url.clone(),
        notice: Some("Account created successfully! Welcome.".to_string()),
        user: UserResponse::from_db(user),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

async fn login_page(
    State(state): State<AppState>,
    MaybeUser(auth): MaybeUser,
) -> Json<LoginPageResponse> {
    Json(LoginPageResponse {
        template: "auth/login.html",
        authenticated: auth.is_some(),
        redirect_to: auth.map(|auth| post_login_redirect(&state, &auth.user)),
    })
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = normalize_email(&payload.email);

    if !state.redis().allow("login", &email, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS).await {
        metrics::record_auth_event("login", "throttled");
        return Err(ApiError::TooManyRequests("Too many login attempts, try again later"));
    }

    let user = repositories::users::find_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?;

    let Some(user) = user else {
        metrics::record_auth_event("login", "failure");
        return Err(ApiError::Unauthorized("Incorrect email or password"));
    };

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect email or password"))?;

    if !verified {
        metrics::record_auth_event("login", "failure");
        return Err(ApiError::Unauthorized("Incorrect email or password"));
    }

    if !user.is_active {
        metrics::record_auth_event("login", "inactive");
        return Err(ApiError::BadRequest("Inactive user".to_string()));
    }

    let now = primitive_now_utc();
    repositories::users::touch_last_login(state.db(), &user.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to record login"))?;

    let access_token = open_session(&state, &user).await?;
    let redirect_to = post_login_redirect(&state, &user);
    tracing::info!(user_id = %user.id, action = "login", redirect_to = %redirect_to, "User logged in");
    metrics::record_auth_event("login", "success");

    let mut user = user;
    user.last_login = Some(now);

    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer",
        redirect_to,
        notice: None,
        user: UserResponse::from_db(user),
    }))
}

/// No confirmation step: any method ends the session and points back at the login page.
async fn logout(
    State(state): State<AppState>,
    MaybeUser(auth): MaybeUser,
) -> Result<Json<LogoutResponse>, ApiError> {
    if let Some(auth) = auth {
        repositories::auth_sessions::revoke(state.db(), &auth.session_id, primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to revoke session"))?;
        tracing::info!(user_id = %auth.user.id, action = "logout", "User logged out");
        metrics::record_auth_event("logout", "success");
    }

    Ok(Json(LogoutResponse { redirect_to: state.settings().api().login_url.clone() }))
}

async fn me(CurrentUser(auth): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(auth.user))
}

/// Staff and superusers land on the dashboard, everyone else on the configured page.
pub(crate) fn post_login_redirect(state: &AppState, user: &User) -> String {
    let api = state.settings().api();
    if user.has_admin_access() {
        api.admin_dashboard_url.clone()
    } else {
        api.login_redirect_url.clone()
    }
}

async fn open_session(state: &AppState, user: &User) -> Result<String, ApiError> {
    let session_id = Uuid::new_v4().to_string();
    let now = primitive_now_utc();

    repositories::auth_sessions::create(
        state.db(),
        repositories::auth_sessions::CreateAuthSession {
            id: &session_id,
            user_id: &user.id,
            created_at: now,
            expires_at: now + security::session_lifetime(state.settings()),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to open session"))?;

    security::create_access_token(&user.id, &session_id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))
}

#[cfg(test)]
mod tests;
