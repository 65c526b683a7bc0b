use serde::{Deserialize, Serialize};

use crate::schemas::user::UserResponse;

/// Every field may be missing on the wire; absent values count as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RegisterRequest {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) password: Option<String>,
    pub(crate) password_confirm: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuthResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: &'static str,
    pub(crate) user: UserResponse,
    pub(crate) redirect_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginPageResponse {
    pub(crate) template: &'static str,
    pub(crate) authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) redirect_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterPageResponse {
    pub(crate) template: &'static str,
    pub(crate) fields: [&'static str; 6],
}

#[derive(Debug, Serialize)]
pub(crate) struct LogoutResponse {
    pub(crate) redirect_to: String,
}
