use std::env;
use std::str::FromStr;

use crate::services::password::PasswordScheme;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub max_pool_size: u32,
    pub acquire_timeout_secs: u64,
    pub password_scheme: PasswordScheme,
    pub admin_seed: Option<AdminSeed>,
}

/// Credentials for the administrator created on first start.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub login: String,
    pub password: String,
    pub email: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let admin_seed = match (env::var("ADMIN_LOGIN"), env::var("ADMIN_PASSWORD")) {
            (Ok(login), Ok(password)) => Some(AdminSeed {
                email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| format!("{login}@localhost.local")),
                login,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parse_var("SERVER_PORT", 8080)?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://user_admin.db".to_string()),
            jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS", 24)?,
            max_pool_size: parse_var("MAX_POOL_SIZE", 5)?,
            acquire_timeout_secs: parse_var("DB_ACQUIRE_TIMEOUT_SECS", 3)?,
            password_scheme: match env::var("PASSWORD_STORAGE") {
                Ok(value) => value
                    .parse()
                    .map_err(|_| ConfigError::Invalid("PASSWORD_STORAGE", value))?,
                Err(_) => PasswordScheme::default(),
            },
            admin_seed,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid(name, value)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
