use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// JWT signing settings
///
/// Access and refresh tokens are signed with independent secrets so that
/// holding one kind of token never allows forging the other.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    /// Access token lifetime in seconds. The service contract is 3600 (1h);
    /// any other value departs from it and is meant for tests only.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds. The service contract is 18000 (5h);
    /// any other value departs from it and is meant for tests only.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,
}

impl JwtSettings {
    /// Reject settings that would break key separation or mint dead tokens
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err(ConfigError::Message(
                "jwt.access_secret and jwt.refresh_secret must both be set".to_string(),
            ));
        }
        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::Message(
                "jwt.access_secret and jwt.refresh_secret must differ".to_string(),
            ));
        }
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(ConfigError::Message(
                "token expiries must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_access_token_expiry() -> i64 {
    60 * 60
}

fn default_refresh_token_expiry() -> i64 {
    5 * 60 * 60
}

/// Load settings from `configuration.yaml` (optional), then `APP_*` env vars.
///
/// Nested keys use a double underscore, e.g. `APP_JWT__ACCESS_SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.jwt.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_settings(access: &str, refresh: &str) -> JwtSettings {
        JwtSettings {
            access_secret: access.to_string(),
            refresh_secret: refresh.to_string(),
            access_token_expiry: default_access_token_expiry(),
            refresh_token_expiry: default_refresh_token_expiry(),
        }
    }

    #[test]
    fn test_default_expiries() {
        assert_eq!(default_access_token_expiry(), 3600);
        assert_eq!(default_refresh_token_expiry(), 18000);
    }

    #[test]
    fn test_distinct_secrets_are_accepted() {
        assert!(jwt_settings("access-secret", "refresh-secret").validate().is_ok());
    }

    #[test]
    fn test_shared_secret_is_rejected() {
        assert!(jwt_settings("same-secret", "same-secret").validate().is_err());
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(jwt_settings("", "refresh-secret").validate().is_err());
        assert!(jwt_settings("access-secret", "").validate().is_err());
    }
}
