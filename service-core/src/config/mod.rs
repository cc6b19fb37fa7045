use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

/// Settings shared by every service binary.
///
/// Loaded from an optional `configuration` file and `APP__*` variables. The
/// conventional `PORT` and `OTLP_ENDPOINT` variables win over both.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.with_overrides(env::var("PORT").ok(), env::var("OTLP_ENDPOINT").ok())
    }

    /// Apply the unprefixed `PORT` / `OTLP_ENDPOINT` values on top of the
    /// layered configuration.
    pub fn with_overrides(
        mut self,
        port: Option<String>,
        otlp_endpoint: Option<String>,
    ) -> Result<Self, AppError> {
        if let Some(raw) = port.filter(|p| !p.trim().is_empty()) {
            self.port = raw.trim().parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid PORT value '{}': {}", raw, e))
            })?;
        }

        if let Some(endpoint) = otlp_endpoint.filter(|e| !e.trim().is_empty()) {
            self.otlp_endpoint = Some(endpoint);
        }

        Ok(self)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
