use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_temperature: f32,
    pub max_generation_attempts: u32,
    pub remote_call_timeout_secs: u64,
    pub submission_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub submit_rps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_temperature: 0.7,
            max_generation_attempts: 3,
            remote_call_timeout_secs: 120,
            submission_timeout_secs: 300,
            max_upload_bytes: 10 * 1024 * 1024,
            submit_rps: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let config = Self {
            server_address: get("SERVER_ADDRESS").unwrap_or(defaults.server_address),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_temperature: parse_or(
                "OPENAI_TEMPERATURE",
                get("OPENAI_TEMPERATURE"),
                defaults.openai_temperature,
            )?,
            max_generation_attempts: parse_or(
                "MAX_GENERATION_ATTEMPTS",
                get("MAX_GENERATION_ATTEMPTS"),
                defaults.max_generation_attempts,
            )?,
            remote_call_timeout_secs: parse_or(
                "REMOTE_CALL_TIMEOUT_SECS",
                get("REMOTE_CALL_TIMEOUT_SECS"),
                defaults.remote_call_timeout_secs,
            )?,
            submission_timeout_secs: parse_or(
                "SUBMISSION_TIMEOUT_SECS",
                get("SUBMISSION_TIMEOUT_SECS"),
                defaults.submission_timeout_secs,
            )?,
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                get("MAX_UPLOAD_BYTES"),
                defaults.max_upload_bytes,
            )?,
            submit_rps: parse_or("SUBMIT_RPS", get("SUBMIT_RPS"), defaults.submit_rps)?,
        };

        if config.max_generation_attempts == 0 {
            return Err(Error::Config(
                "MAX_GENERATION_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&config.openai_temperature) {
            return Err(Error::Config(format!(
                "OPENAI_TEMPERATURE must be between 0 and 2, got {}",
                config.openai_temperature
            )));
        }

        Ok(config)
    }

    /// The credential, or the startup error every submission reports while it is absent.
    pub fn require_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("Missing environment variable: OPENAI_API_KEY".to_string()))
    }

    pub fn remote_call_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_call_timeout_secs)
    }

    pub fn submission_timeout(&self) -> Duration {
        Duration::from_secs(self.submission_timeout_secs)
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}
