use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::net::SocketAddr;

/// Listener settings shared by every service.
///
/// Sources, lowest precedence first: an optional `configuration` file,
/// `APP__*` environment variables, then the bare `SERVER_PORT` variable.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .set_override_option("port", std::env::var("SERVER_PORT").ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid listen address: {}", e)))
    }
}
