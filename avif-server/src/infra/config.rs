//! Environment-driven service configuration.
//!
//! Everything has a permissive default so the binary runs with no
//! environment at all; deployments tighten via `AVIF_*` variables.

use std::fmt::Display;
use std::str::FromStr;

use anyhow::Result;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

/// Upload/fetch body cap applied when `AVIF_MAX_BODY_BYTES` is unset.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn is_wildcard(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            cors: CorsConfig {
                allowed_origins: vec!["*".to_string()],
                allowed_methods: vec!["*".to_string()],
                allowed_headers: vec!["*".to_string()],
                allow_credentials: true,
            },
            limits: LimitsConfig {
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
        }
    }
}

impl Config {
    /// Load configuration from the environment on top of the defaults.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig {
                host: env_or("AVIF_HOST", DEFAULT_HOST),
                port: parse_env("AVIF_PORT", DEFAULT_PORT)?,
            },
            cors: CorsConfig {
                allowed_origins: env_list("AVIF_CORS_ORIGINS"),
                allowed_methods: env_list("AVIF_CORS_METHODS"),
                allowed_headers: env_list("AVIF_CORS_HEADERS"),
                allow_credentials: parse_env("AVIF_CORS_ALLOW_CREDENTIALS", true)?,
            },
            limits: LimitsConfig {
                max_body_bytes: parse_env("AVIF_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| anyhow::anyhow!("invalid {key} value '{raw}': {err}")),
        Err(_) => Ok(default),
    }
}

/// Comma-separated list variable; unset means the `*` wildcard.
fn env_list(key: &str) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        Err(_) => vec!["*".to_string()],
    }
}
