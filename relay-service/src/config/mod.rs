use axum::http::HeaderValue;
use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

use crate::services::providers::gemini::{GeminiConfig, GEMINI_API_BASE};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_VOICE: &str = "Puck";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub cors: CorsSettings,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Secret<String>,
    pub model: String,
    pub voice: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl GeminiSettings {
    pub fn provider_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            api_base: self.api_base.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorsSettings {
    pub allowed_origins: AllowedOrigins,
}

/// Which browser origins may call the API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// Any origin (`*`).
    #[default]
    Any,
    List(Vec<HeaderValue>),
}

impl AllowedOrigins {
    /// Parse `CORS_ALLOWED_ORIGINS`: `*` or a comma-separated origin list.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let origins: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .collect();

        if origins.is_empty() || origins.contains(&"*") {
            return Ok(AllowedOrigins::Any);
        }

        origins
            .into_iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AllowedOrigins::List)
    }
}

impl RelayConfig {
    /// Load from `.env`, the optional `configuration` file and the process
    /// environment. `Application::build_with_provider` validates the result.
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_lookup(common, |key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";
        let get = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        let timeout_raw = get(
            "GEMINI_TIMEOUT_SECS",
            Some(&DEFAULT_TIMEOUT_SECS.to_string()),
        )?;
        let timeout_secs = timeout_raw.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid GEMINI_TIMEOUT_SECS value '{}': {}",
                timeout_raw,
                e
            ))
        })?;

        Ok(RelayConfig {
            common,
            gemini: GeminiSettings {
                api_key: Secret::new(get("GEMINI_API_KEY", None)?),
                model: get("GEMINI_MODEL", Some(DEFAULT_MODEL))?,
                voice: get("GEMINI_VOICE", Some(DEFAULT_VOICE))?,
                api_base: get("GEMINI_API_BASE", Some(GEMINI_API_BASE))?,
                timeout_secs,
            },
            cors: CorsSettings {
                allowed_origins: AllowedOrigins::parse(&get("CORS_ALLOWED_ORIGINS", Some("*"))?)?,
            },
        })
    }

    /// Startup precondition check, run before any listener binds.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.gemini.api_key.expose_secret().trim().is_empty() {
            return Err(missing("GEMINI_API_KEY"));
        }
        if self.gemini.model.trim().is_empty() {
            return Err(missing("GEMINI_MODEL"));
        }
        if self.gemini.voice.trim().is_empty() {
            return Err(missing("GEMINI_VOICE"));
        }
        if self.gemini.timeout_secs == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GEMINI_TIMEOUT_SECS must be greater than zero"
            )));
        }
        Ok(())
    }
}

fn missing(key: &str) -> AppError {
    AppError::ConfigError(anyhow::anyhow!("{} environment variable is not set", key))
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.is_empty()) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(missing(key))
            }
        }
    }
}
