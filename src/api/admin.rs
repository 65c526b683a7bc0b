use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStaff;
use crate::api::validation::FormErrors;
use crate::core::{metrics, security, state::AppState, time::primitive_now_utc};
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::admin::{
    DashboardQuery, FormField, RoleChoice, UserForm, UserFormContext, UserFormInitial,
    UserFormPage, UserMutationResponse,
};
use crate::schemas::user::UserResponse;
use crate::services::dashboard::{self, TabPage};

const USER_FORM_TEMPLATE: &str = "admin/user_form.html";
const EMAIL_TAKEN: &str = "A user with this email already exists.";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard_tab))
        .route("/admin/users/create", get(create_user_form).post(create_user))
        .route("/admin/users/:user_id/update", get(update_user_form).post(update_user))
}

async fn dashboard_tab(
    CurrentStaff(admin): CurrentStaff,
    Query(params): Query<DashboardQuery>,
    State(state): State<AppState>,
) -> Result<Json<TabPage>, ApiError> {
    let page = dashboard::render_tab(state.db(), params.tab.as_deref(), params.role.as_deref())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to render admin tab"))?;

    tracing::debug!(admin_id = %admin.id, tab = page.context.tab, "Rendered admin tab");
    metrics::record_tab_view(page.context.tab);

    Ok(Json(page))
}

fn form_fields(password_required: bool) -> Vec<FormField> {
    vec![
        FormField { name: "first_name", label: "First name", required: true },
        FormField { name: "last_name", label: "Last name", required: true },
        FormField { name: "email", label: "Email address", required: true },
        FormField { name: "phone", label: "Phone", required: true },
        FormField { name: "role", label: "Role", required: true },
        FormField { name: "is_active", label: "Active", required: true },
        FormField {
            name: "password",
            label: if password_required { "Password" } else { "New password (optional)" },
            required: password_required,
        },
    ]
}

async fn create_user_form(CurrentStaff(_admin): CurrentStaff) -> Json<UserFormPage> {
    Json(UserFormPage {
        template: USER_FORM_TEMPLATE,
        context: UserFormContext {
            page_title: "New user".to_string(),
            page_sub: "Create a user account",
            fields: form_fields(true),
            role_choices: RoleChoice::all(),
            user_obj: None,
        },
    })
}

/// Field checks shared by create and update. Email uniqueness and the password
/// requirement are decided by the caller.
fn check_form(form: &UserForm) -> (FormErrors, Option<UserRole>) {
    let mut errors = FormErrors::new();
    let role = UserRole::parse(&form.role);

    let validated = form.validate();
    let (before_role, after_role) = UserForm::FIELD_ORDER.split_at(4);
    errors.absorb(&validated, before_role);

    if form.role.is_empty() {
        errors.add("role", "This field is required.");
    } else if role.is_none() {
        errors.add(
            "role",
            format!("Select a valid choice. {} is not one of the available choices.", form.role),
        );
    }
    if form.is_active.is_none() {
        errors.add("is_active", "This field is required.");
    }

    errors.absorb(&validated, after_role);
    (errors, role)
}

async fn create_user(
    CurrentStaff(admin): CurrentStaff,
    State(state): State<AppState>,
    Json(form): Json<UserForm>,
) -> Result<(StatusCode, Json<UserMutationResponse>), ApiError> {
    let form = form.trimmed();
    let (mut errors, role) = check_form(&form);

    if form.password.is_none() {
        errors.add("password", "This field is required.");
    }

    if !errors.has("email") {
        let existing = repositories::users::exists_by_email(state.db(), &form.email)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
        if existing.is_some() {
            errors.add("email", EMAIL_TAKEN);
        }
    }

    let submitted = form.submitted();
    errors.finish(submitted.clone())?;

    let (Some(role), Some(is_active), Some(password)) =
        (role, form.is_active, form.password.as_deref())
    else {
        return Err(ApiError::BadRequest("Incomplete user form".to_string()));
    };

    let hashed_password = security::hash_password(password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let now = primitive_now_utc();

    let created = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email: &form.email,
            hashed_password,
            first_name: &form.first_name,
            last_name: &form.last_name,
            phone: &form.phone,
            role,
            is_active,
            is_staff: role.grants_staff(),
            is_superuser: false,
            created_at: now,
            updated_at: now,
        },
    )
    .await;

    let user = match created {
        Ok(user) => user,
        Err(err) if crate::db::is_unique_violation(&err) => {
            return Err(ApiError::field("email", EMAIL_TAKEN, submitted));
        }
        Err(err) => return Err(ApiError::internal(err, "Failed to create user")),
    };

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        action = "create_user",
        "Admin created user"
    );

    Ok((
        StatusCode::CREATED,
        Json(UserMutationResponse {
            user: UserResponse::from_db(user),
            notice: "User created successfully.",
            redirect_to: state.settings().api().users_tab_url(),
        }),
    ))
}

async fn update_user_form(
    Path(user_id): Path<String>,
    CurrentStaff(_admin): CurrentStaff,
    State(state): State<AppState>,
) -> Result<Json<UserFormPage>, ApiError> {
    let user = repositories::users::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserFormPage {
        template: USER_FORM_TEMPLATE,
        context: UserFormContext {
            page_title: format!("Edit user: {}", user.full_name()),
            page_sub: "Edit account information",
            fields: form_fields(false),
            role_choices: RoleChoice::all(),
            user_obj: Some(UserFormInitial::from_user(&user)),
        },
    }))
}

async fn update_user(
    Path(user_id): Path<String>,
    CurrentStaff(admin): CurrentStaff,
    State(state): State<AppState>,
    Json(form): Json<UserForm>,
) -> Result<Json<UserMutationResponse>, ApiError> {
    let existing = repositories::users::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let form = form.trimmed();
    let (mut errors, role) = check_form(&form);

    if !errors.has("email") {
        let taken = repositories::users::email_taken_by_other(state.db(), &form.email, &existing.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
        if taken {
            errors.add("email", EMAIL_TAKEN);
        }
    }

    let submitted = form.submitted();
    errors.finish(submitted.clone())?;

    let (Some(role), Some(is_active)) = (role, form.is_active) else {
        return Err(ApiError::BadRequest("Incomplete user form".to_string()));
    };

    // Blank password keeps the stored hash.
    let hashed_password = form
        .password
        .as_deref()
        .map(security::hash_password)
        .transpose()
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let password_changed = hashed_password.is_some();

    let updated = repositories::users::update(
        state.db(),
        &existing.id,
        repositories::users::UpdateUser {
            email: &form.email,
            first_name: &form.first_name,
            last_name: &form.last_name,
            phone: &form.phone,
            role,
            is_active,
            is_staff: role.grants_staff(),
            hashed_password,
            updated_at: primitive_now_utc(),
        },
    )
    .await;

    let user = match updated {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ApiError::NotFound("User not found".to_string())),
        Err(err) if crate::db::is_unique_violation(&err) => {
            return Err(ApiError::field("email", EMAIL_TAKEN, submitted));
        }
        Err(err) => return Err(ApiError::internal(err, "Failed to update user")),
    };

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        action = "update_user",
        password_changed,
        "Admin updated user"
    );

    Ok(Json(UserMutationResponse {
        user: UserResponse::from_db(user),
        notice: "User updated.",
        redirect_to: state.settings().api().users_tab_url(),
    }))
}
