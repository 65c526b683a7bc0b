use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Admin,
    Staff,
    Teacher,
    #[default]
    Student,
}

impl UserRole {
    /// Canonical declaration order; dashboards and form choices follow it.
    pub(crate) const ALL: [UserRole; 4] =
        [UserRole::Admin, UserRole::Staff, UserRole::Teacher, UserRole::Student];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Staff => "Staff",
            Self::Teacher => "Teacher",
            Self::Student => "Student",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == value)
    }

    /// Roles that open the admin dashboard on their own.
    pub(crate) fn grants_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Staff)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "contenttype", rename_all = "lowercase")]
pub(crate) enum ContentType {
    Course,
    Exam,
    Correction,
}

impl ContentType {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Course => "Course",
            Self::Exam => "Exam",
            Self::Correction => "Correction",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_from_their_keys_only() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("Teacher"), None);
        assert_eq!(UserRole::parse("all"), None);
        assert_eq!(UserRole::parse(""), None);
    }

    #[test]
    fn default_role_is_student() {
        assert_eq!(UserRole::default(), UserRole::Student);
    }

    #[test]
    fn only_admin_and_staff_grant_staff() {
        let granting: Vec<_> = UserRole::ALL.into_iter().filter(|r| r.grants_staff()).collect();
        assert_eq!(granting, vec![UserRole::Admin, UserRole::Staff]);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(UserRole::Teacher).unwrap(), "teacher");
        assert_eq!(serde_json::to_value(ContentType::Correction).unwrap(), "correction");
    }
}
