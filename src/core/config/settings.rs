use super::parsing::{
    env_optional, env_or_default, is_relative_url, parse_bool, parse_cors_origins,
    parse_environment, parse_u16, parse_u64,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    AdminSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, RedisSettings,
    RuntimeSettings, SecuritySettings, ServerHost, ServerPort, ServerSettings, Settings,
    TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("EDU_HOST", "0.0.0.0");
        let port = env_or_default("EDU_PORT", "8000");

        let environment =
            parse_environment(env_optional("EDU_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("EDU_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Wilfried Education");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let home_url = env_or_default("HOME_URL", "/");
        let login_url = env_or_default("LOGIN_URL", "/login");
        let login_redirect_url = env_or_default("LOGIN_REDIRECT_URL", "/");
        let admin_dashboard_url = env_or_default("ADMIN_DASHBOARD_URL", "/admin");

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };

        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "edu");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "wilfried_edu");
        let database_url = env_optional("DATABASE_URL");

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let first_superuser_email =
            env_or_default("FIRST_SUPERUSER_EMAIL", "admin@wilfried-education.local")
                .to_lowercase();
        let first_superuser_password = env_or_default("FIRST_SUPERUSER_PASSWORD", "");

        let log_level = env_or_default("EDU_LOG_LEVEL", "info");
        let json = env_optional("EDU_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings {
                project_name,
                version,
                home_url,
                login_url,
                login_redirect_url,
                admin_dashboard_url,
            },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            admin: AdminSettings { first_superuser_email, first_superuser_password },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let navigation = [
            ("HOME_URL", &self.api.home_url),
            ("LOGIN_URL", &self.api.login_url),
            ("LOGIN_REDIRECT_URL", &self.api.login_redirect_url),
            ("ADMIN_DASHBOARD_URL", &self.api.admin_dashboard_url),
        ];
        for (field, value) in navigation {
            if !is_relative_url(value) {
                return Err(ConfigError::InvalidValue { field, value: value.clone() });
            }
        }

        if self.admin.first_superuser_email.is_empty() || !self.admin.first_superuser_email.contains('@')
        {
            return Err(ConfigError::InvalidValue {
                field: "FIRST_SUPERUSER_EMAIL",
                value: self.admin.first_superuser_email.clone(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.admin.first_superuser_password.is_empty() {
            return Err(ConfigError::MissingSecret("FIRST_SUPERUSER_PASSWORD"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use crate::test_support;

    #[tokio::test]
    async fn defaults_point_navigation_at_local_routes() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.api().home_url, "/");
        assert_eq!(settings.api().login_url, "/login");
        assert_eq!(settings.api().admin_dashboard_url, "/admin");
        assert_eq!(settings.api().users_tab_url(), "/admin?tab=users");
    }

    #[tokio::test]
    async fn absolute_redirect_urls_are_rejected() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("LOGIN_REDIRECT_URL", "https://evil.example/");

        let result = Settings::load();
        std::env::remove_var("LOGIN_REDIRECT_URL");

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn strict_mode_requires_superuser_password() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("EDU_STRICT_CONFIG", "1");
        std::env::set_var("POSTGRES_PASSWORD", "secret");
        std::env::remove_var("FIRST_SUPERUSER_PASSWORD");

        let result = Settings::load();
        std::env::set_var("EDU_STRICT_CONFIG", "0");
        std::env::remove_var("POSTGRES_PASSWORD");

        let err = result.expect_err("strict config must fail");
        assert!(err.to_string().contains("FIRST_SUPERUSER_PASSWORD"));
    }
}
