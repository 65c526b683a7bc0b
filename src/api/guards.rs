use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState, time::primitive_now_utc};
use crate::db::models::User;
use crate::repositories;

/// A verified token whose session row is still live.
pub(crate) struct Authenticated {
    pub(crate) user: User,
    pub(crate) session_id: String,
}

pub(crate) struct CurrentUser(pub(crate) Authenticated);

/// Staff flag or superuser; anything less is a 403.
pub(crate) struct CurrentStaff(pub(crate) User);

/// Never rejects on missing or stale credentials.
pub(crate) struct MaybeUser(pub(crate) Option<Authenticated>);

async fn authenticate(parts: &Parts, app_state: &AppState) -> Result<Authenticated, ApiError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized("Authentication required"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

    let claims = security::verify_token(token, app_state.settings())
        .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

    let session = repositories::auth_sessions::find_active(
        app_state.db(),
        &claims.sid,
        &claims.sub,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load session"))?;

    if session.is_none() {
        return Err(ApiError::Unauthorized("Session expired or revoked"));
    }

    let user = repositories::users::find_by_id(app_state.db(), &claims.sub)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

    let Some(user) = user else {
        return Err(ApiError::Unauthorized("User not found"));
    };

    if !user.is_active {
        return Err(ApiError::Unauthorized("Invalid authentication credentials"));
    }

    Ok(Authenticated { user, session_id: claims.sid })
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(CurrentUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStaff {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(auth) = CurrentUser::from_request_parts(parts, state).await?;

        if auth.user.has_admin_access() {
            Ok(CurrentStaff(auth.user))
        } else {
            tracing::warn!(user_id = %auth.user.id, "Non-staff user attempted admin access");
            Err(ApiError::Forbidden("Staff access required"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state).await {
            Ok(auth) => Ok(MaybeUser(Some(auth))),
            Err(ApiError::Unauthorized(_)) => Ok(MaybeUser(None)),
            Err(err) => Err(err),
        }
    }
}
