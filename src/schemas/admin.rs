use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::User;
use crate::db::types::UserRole;

/// Body of the admin create and update forms. Fields are optional on the wire so that
/// a missing value becomes a field error instead of a rejected request.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub(crate) struct UserForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub(crate) first_name: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub(crate) last_name: String,
    #[validate(
        length(min = 1, message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    pub(crate) email: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub(crate) phone: String,
    pub(crate) role: String,
    pub(crate) is_active: Option<bool>,
    #[validate(length(min = 8, message = "Ensure this value has at least 8 characters."))]
    pub(crate) password: Option<String>,
}

impl UserForm {
    pub(crate) const FIELD_ORDER: [&'static str; 7] =
        ["first_name", "last_name", "email", "phone", "role", "is_active", "password"];

    pub(crate) fn trimmed(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = crate::api::validation::normalize_email(&self.email);
        self.phone = self.phone.trim().to_string();
        self.role = self.role.trim().to_string();
        self.password = self.password.filter(|password| !password.is_empty());
        self
    }

    /// Submitted values as echoed back on failure; the password never leaves the server.
    pub(crate) fn submitted(&self) -> serde_json::Value {
        serde_json::json!({
            "first_name": self.first_name,
            "last_name": self.last_name,
            "email": self.email,
            "phone": self.phone,
            "role": self.role,
            "is_active": self.is_active,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RoleChoice {
    pub(crate) value: UserRole,
    pub(crate) label: &'static str,
}

impl RoleChoice {
    pub(crate) fn all() -> Vec<RoleChoice> {
        UserRole::ALL.into_iter().map(|role| RoleChoice { value: role, label: role.label() }).collect()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FormField {
    pub(crate) name: &'static str,
    pub(crate) label: &'static str,
    pub(crate) required: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserFormInitial {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
}

impl UserFormInitial {
    pub(crate) fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UserFormContext {
    pub(crate) page_title: String,
    pub(crate) page_sub: &'static str,
    pub(crate) fields: Vec<FormField>,
    pub(crate) role_choices: Vec<RoleChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user_obj: Option<UserFormInitial>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserFormPage {
    pub(crate) template: &'static str,
    pub(crate) context: UserFormContext,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserMutationResponse {
    pub(crate) user: crate::schemas::user::UserResponse,
    pub(crate) notice: &'static str,
    pub(crate) redirect_to: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardQuery {
    pub(crate) tab: Option<String>,
    pub(crate) role: Option<String>,
}
