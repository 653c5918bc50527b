//! Configuration for subscription-service.

use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    /// Build a connection URL from discrete `DB_*` settings.
    pub fn url_from_parts(host: &str, port: u16, user: &str, password: &str, name: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            user, password, host, port, name
        )
    }
}

impl SubscriptionConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => DatabaseConfig::url_from_parts(
                &get_env("DB_HOST", Some("localhost"))?,
                parse_env("DB_PORT", "5432")?,
                &get_env("DB_USER", Some("postgres"))?,
                &get_env("DB_PASSWORD", Some(""))?,
                &get_env("DB_NAME", Some("subscriptions"))?,
            ),
        };

        let config = SubscriptionConfig {
            common,
            service_name: get_env("SERVICE_NAME", Some("subscription-service"))?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")))?,
            log_level: get_env("LOG_LEVEL", Some("info"))?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                url,
                max_connections: parse_env("DB_MAX_CONNECTIONS", "10")?,
                min_connections: parse_env("DB_MIN_CONNECTIONS", "1")?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.max_connections == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "DB_MAX_CONNECTIONS must be greater than 0"
            )));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                self.database.min_connections,
                self.database.max_connections
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => default.map(str::to_string).ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("{} is required but not set", key))
        }),
    }
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key, Some(default))?
        .parse()
        .map_err(|e: T::Err| AppError::ConfigError(anyhow::anyhow!("{} is invalid: {}", key, e)))
}
