use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Creates the configured superuser, or repairs its password and flags if drifted.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let email = &admin.first_superuser_email;
    let now = primitive_now_utc();

    if let Some(user) = repositories::users::find_by_email(state.db(), email).await? {
        let password_matches =
            security::verify_password(&admin.first_superuser_password, &user.hashed_password)
                .unwrap_or(false);
        let flags_match = user.role == UserRole::Admin
            && user.is_active
            && user.is_staff
            && user.is_superuser;

        if password_matches && flags_match {
            tracing::info!("Default superuser already up to date");
            return Ok(());
        }

        let hashed_password = if password_matches {
            user.hashed_password.clone()
        } else {
            security::hash_password(&admin.first_superuser_password)?
        };

        sqlx::query(
            "UPDATE users
             SET hashed_password = $1,
                 role = $2,
                 is_active = TRUE,
                 is_staff = TRUE,
                 is_superuser = TRUE,
                 updated_at = $3
             WHERE id = $4",
        )
        .bind(hashed_password)
        .bind(UserRole::Admin)
        .bind(now)
        .bind(&user.id)
        .execute(state.db())
        .await?;

        tracing::info!(email = %email, "Updated default superuser");
        return Ok(());
    }

    let id = Uuid::new_v4().to_string();
    repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &id,
            email,
            hashed_password: security::hash_password(&admin.first_superuser_password)?,
            first_name: "Super",
            last_name: "Admin",
            phone: "",
            role: UserRole::Admin,
            is_active: true,
            is_staff: true,
            is_superuser: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!(email = %email, "Created default superuser");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn creates_then_repairs_superuser() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("FIRST_SUPERUSER_EMAIL", "root@example.com");
        std::env::set_var("FIRST_SUPERUSER_PASSWORD", "bootstrap-pass");
        let Some(state) = test_support::test_state().await else {
            return;
        };

        ensure_superuser(&state).await.expect("create");
        let user = repositories::users::find_by_email(state.db(), "root@example.com")
            .await
            .expect("query")
            .expect("superuser");
        assert!(user.is_superuser && user.is_staff && user.is_active);
        assert_eq!(user.role, UserRole::Admin);

        sqlx::query("UPDATE users SET is_active = FALSE, role = 'student' WHERE id = $1")
            .bind(&user.id)
            .execute(state.db())
            .await
            .expect("drift");

        ensure_superuser(&state).await.expect("repair");
        let repaired =
            repositories::users::find_by_id(state.db(), &user.id).await.expect("query").expect("row");
        assert!(repaired.is_active);
        assert_eq!(repaired.role, UserRole::Admin);
        assert!(security::verify_password("bootstrap-pass", &repaired.hashed_password).unwrap());
    }
}
