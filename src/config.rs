use crate::{api::M2mConfig, messaging::KafkaConfig};
use std::{env, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("{0} is not a valid number")]
    InvalidNumber(&'static str)
}

/// Process configuration, read once at startup from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub kafka: KafkaConfig,
    pub m2m: M2mConfig,
    /// How long a fetched M2M token stays valid locally
    pub token_cache_time: Duration,
    pub v5_api_url: String,
    pub log_level: String,
    pub healthcheck_port: u16
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;

        let token_cache_ms = env::var("TOKEN_CACHE_TIME")
            .unwrap_or_else(|_| "86400000".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber("TOKEN_CACHE_TIME"))?;

        let healthcheck_port = env::var("HEALTHCHECK_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber("HEALTHCHECK_PORT"))?;

        Ok(Self {
            database_url,
            kafka: KafkaConfig::from_env(),
            m2m: M2mConfig {
                auth_url: env::var("AUTH0_URL").unwrap_or_default(),
                audience: env::var("AUTH0_AUDIENCE").unwrap_or_default(),
                client_id: env::var("AUTH0_CLIENT_ID").unwrap_or_default(),
                client_secret: env::var("AUTH0_CLIENT_SECRET").unwrap_or_default()
            },
            token_cache_time: Duration::from_millis(token_cache_ms),
            v5_api_url: env::var("V5_API_URL").unwrap_or_else(|_| "https://api.topcoder.com/v5".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            healthcheck_port
        })
    }
}
