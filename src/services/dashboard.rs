use serde::Serialize;
use sqlx::PgPool;

use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::user::UserResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tab {
    Dashboard,
    Users,
    Errors,
    Settings,
}

/// Extra data a tab pulls into its context beyond the common fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TabBinding {
    Stats,
    Users,
    None,
}

#[derive(Debug)]
pub(crate) struct TabConfig {
    pub(crate) tab: Tab,
    pub(crate) key: &'static str,
    pub(crate) title: &'static str,
    pub(crate) subtitle: &'static str,
    pub(crate) template: &'static str,
    pub(crate) binding: TabBinding,
}

pub(crate) static TABS: [TabConfig; 4] = [
    TabConfig {
        tab: Tab::Dashboard,
        key: "dashboard",
        title: "Dashboard",
        subtitle: "Overview and statistics",
        template: "admin/tab_content.html",
        binding: TabBinding::Stats,
    },
    TabConfig {
        tab: Tab::Users,
        key: "users",
        title: "User management",
        subtitle: "Create, edit and manage accounts",
        template: "admin/users_list.html",
        binding: TabBinding::Users,
    },
    TabConfig {
        tab: Tab::Errors,
        key: "errors",
        title: "Errors and logs",
        subtitle: "Error tracking and system logs",
        template: "admin/tab_content.html",
        binding: TabBinding::None,
    },
    TabConfig {
        tab: Tab::Settings,
        key: "settings",
        title: "Settings",
        subtitle: "General application settings",
        template: "admin/tab_content.html",
        binding: TabBinding::None,
    },
];

impl Tab {
    /// Unknown and missing keys fall back to the dashboard.
    pub(crate) fn resolve(key: Option<&str>) -> Self {
        key.and_then(|key| TABS.iter().find(|config| config.key == key))
            .map(|config| config.tab)
            .unwrap_or(Tab::Dashboard)
    }

    pub(crate) fn config(self) -> &'static TabConfig {
        match self {
            Tab::Dashboard => &TABS[0],
            Tab::Users => &TABS[1],
            Tab::Errors => &TABS[2],
            Tab::Settings => &TABS[3],
        }
    }
}

/// `role` query parameter of the users tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RoleFilter {
    All,
    Role(UserRole),
    /// A value naming no declared role; matches nobody.
    Unknown(String),
}

impl RoleFilter {
    pub(crate) fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("all") => RoleFilter::All,
            Some(value) => match UserRole::parse(value) {
                Some(role) => RoleFilter::Role(role),
                None => RoleFilter::Unknown(value.to_string()),
            },
        }
    }

    pub(crate) fn echo(&self) -> String {
        match self {
            RoleFilter::All => "all".to_string(),
            RoleFilter::Role(role) => role.as_str().to_string(),
            RoleFilter::Unknown(value) => value.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TabLink {
    pub(crate) key: &'static str,
    pub(crate) title: &'static str,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub(crate) struct RoleCount {
    pub(crate) role: UserRole,
    pub(crate) label: &'static str,
    pub(crate) count: i64,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub(crate) struct DashboardStats {
    pub(crate) users: i64,
    pub(crate) content: i64,
    pub(crate) catalog_available: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct TabContext {
    pub(crate) tab: &'static str,
    pub(crate) page_title: &'static str,
    pub(crate) page_sub: &'static str,
    pub(crate) user_count: i64,
    pub(crate) available_tabs: Vec<TabLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) content_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stats: Option<DashboardStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) role_breakdown: Option<Vec<RoleCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) users: Option<Vec<UserResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) current_role_filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TabPage {
    pub(crate) template: &'static str,
    pub(crate) context: TabContext,
}

pub(crate) fn available_tabs() -> Vec<TabLink> {
    TABS.iter().map(|config| TabLink { key: config.key, title: config.title }).collect()
}

/// One entry per declared role in canonical order, zero where nobody holds it.
pub(crate) fn role_breakdown(counts: &[(UserRole, i64)]) -> Vec<RoleCount> {
    UserRole::ALL
        .into_iter()
        .map(|role| RoleCount {
            role,
            label: role.label(),
            count: counts
                .iter()
                .filter(|(counted, _)| *counted == role)
                .map(|(_, count)| *count)
                .sum(),
        })
        .collect()
}

pub(crate) fn dashboard_stats(user_count: i64, content_count: Option<i64>) -> DashboardStats {
    DashboardStats {
        users: user_count,
        content: content_count.unwrap_or(0),
        catalog_available: content_count.is_some(),
    }
}

/// Builds the template name and context for `tab_key`, resolving unknown keys to the
/// dashboard. Catalog failures degrade the statistics instead of failing the page.
pub(crate) async fn render_tab(
    pool: &PgPool,
    tab_key: Option<&str>,
    role: Option<&str>,
) -> Result<TabPage, sqlx::Error> {
    let config = Tab::resolve(tab_key).config();
    let user_count = repositories::users::count_active(pool).await?;

    let mut context = TabContext {
        tab: config.key,
        page_title: config.title,
        page_sub: config.subtitle,
        user_count,
        available_tabs: available_tabs(),
        content_count: None,
        stats: None,
        role_breakdown: None,
        users: None,
        current_role_filter: None,
    };

    match config.binding {
        TabBinding::Stats => {
            let content_count = match repositories::contents::count_published(pool).await {
                Ok(count) => Some(count),
                Err(err) => {
                    tracing::warn!(error = %err, "Catalog unavailable; dashboard statistics degraded");
                    None
                }
            };
            let counts = repositories::users::count_active_by_role(pool).await?;

            context.content_count = Some(content_count.unwrap_or(0));
            context.stats = Some(dashboard_stats(user_count, content_count));
            context.role_breakdown = Some(role_breakdown(&counts));
        }
        TabBinding::Users => {
            let filter = RoleFilter::parse(role);
            let users = match &filter {
                RoleFilter::All => repositories::users::list(pool, None).await?,
                RoleFilter::Role(role) => repositories::users::list(pool, Some(*role)).await?,
                RoleFilter::Unknown(_) => Vec::new(),
            };

            context.users = Some(users.into_iter().map(UserResponse::from_db).collect());
            context.current_role_filter = Some(filter.echo());
        }
        TabBinding::None => {}
    }

    Ok(TabPage { template: config.template, context })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_and_missing_tabs_resolve_to_dashboard() {
        assert_eq!(Tab::resolve(None), Tab::Dashboard);
        assert_eq!(Tab::resolve(Some("nonexistent-tab")), Tab::Dashboard);
        assert_eq!(Tab::resolve(Some("USERS")), Tab::Dashboard);
        assert_eq!(Tab::resolve(Some("users")), Tab::Users);
        assert_eq!(Tab::resolve(Some("settings")), Tab::Settings);
    }

    #[test]
    fn registry_entries_match_their_tab() {
        for config in &TABS {
            assert_eq!(config.tab.config().key, config.key);
            assert_eq!(Tab::resolve(Some(config.key)), config.tab);
        }
        assert_eq!(Tab::Users.config().template, "admin/users_list.html");
        assert_eq!(Tab::Errors.config().template, "admin/tab_content.html");
    }

    #[test]
    fn available_tabs_keep_registry_order() {
        let keys: Vec<_> = available_tabs().into_iter().map(|link| link.key).collect();
        assert_eq!(keys, vec!["dashboard", "users", "errors", "settings"]);
    }

    #[test]
    fn role_filter_parsing() {
        assert_eq!(RoleFilter::parse(None), RoleFilter::All);
        assert_eq!(RoleFilter::parse(Some("")), RoleFilter::All);
        assert_eq!(RoleFilter::parse(Some("all")), RoleFilter::All);
        assert_eq!(RoleFilter::parse(Some("teacher")), RoleFilter::Role(UserRole::Teacher));

        let unknown = RoleFilter::parse(Some("wizard"));
        assert_eq!(unknown, RoleFilter::Unknown("wizard".to_string()));
        assert_eq!(unknown.echo(), "wizard");
        assert_eq!(RoleFilter::All.echo(), "all");
    }

    #[test]
    fn breakdown_lists_every_role_in_canonical_order() {
        let breakdown = role_breakdown(&[(UserRole::Student, 5), (UserRole::Admin, 1)]);

        let roles: Vec<_> = breakdown.iter().map(|entry| entry.role).collect();
        assert_eq!(roles, UserRole::ALL.to_vec());
        let counts: Vec<_> = breakdown.iter().map(|entry| entry.count).collect();
        assert_eq!(counts, vec![1, 0, 0, 5]);
        assert_eq!(breakdown[0].label, "Administrator");
    }

    #[test]
    fn breakdown_of_empty_counts_is_all_zero() {
        let breakdown = role_breakdown(&[]);
        assert_eq!(breakdown.len(), 4);
        assert!(breakdown.iter().all(|entry| entry.count == 0));
    }

    #[test]
    fn stats_degrade_when_catalog_missing() {
        assert_eq!(
            dashboard_stats(7, None),
            DashboardStats { users: 7, content: 0, catalog_available: false }
        );
        assert_eq!(
            dashboard_stats(7, Some(3)),
            DashboardStats { users: 7, content: 3, catalog_available: true }
        );
    }
}
