use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    pub super_admin: SuperAdminSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
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

/// Revocation ledger (Redis) settings
#[derive(serde::Deserialize, Clone)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
}

impl RedisSettings {
    pub fn connection_string(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

/// Token signing settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub session_token_expiry: i64, // seconds (default 2592000 = 30 days)
    pub api_token_expiry: i64,     // seconds (default ~30 years)
}

impl JwtSettings {
    /// Defaults used when no configuration file overrides them.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            session_token_expiry: 30 * 24 * 60 * 60,
            api_token_expiry: 30 * 365 * 24 * 60 * 60,
        }
    }
}

/// Bootstrap account created on first startup if no SUPER_ADMIN exists
#[derive(serde::Deserialize, Clone)]
pub struct SuperAdminSettings {
    pub email: String,
    pub password: String,
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()?;
    settings.try_deserialize::<Settings>()
}
