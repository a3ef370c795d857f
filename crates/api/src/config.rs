//! Server configuration.
//!
//! Sources, later ones winning: built-in defaults, optional `voltran.toml` in
//! the working directory, then `VOLTRAN_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use voltran_infra::LedgerConfig;
use voltran_observability::LogFormat;

pub const CONFIG_FILE: &str = "voltran.toml";
pub const ENV_PREFIX: &str = "VOLTRAN_";
const DEV_JWT_SECRET: &str = "voltran-dev-secret";
const JOURNAL_FILE: &str = "journal.jsonl";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// HS256 secret for bearer tokens.
    #[serde(default)]
    pub jwt_secret: Option<SecretString>,

    /// Directory of the journal file; unset keeps everything in memory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Comma-separated list of origins allowed by CORS.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,

    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_allowed_origins() -> String {
    "http://localhost:5173,http://localhost:3000".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    LedgerConfig::DEFAULT_LOCK_TIMEOUT.as_millis() as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            jwt_secret: None,
            data_dir: None,
            allowed_origins: default_allowed_origins(),
            lock_timeout_ms: default_lock_timeout_ms(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load from `voltran.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Configured secret, or an insecure development default.
    pub fn jwt_secret(&self) -> SecretString {
        match &self.jwt_secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!("VOLTRAN_JWT_SECRET not set; using insecure dev default");
                SecretString::new(DEV_JWT_SECRET.to_string())
            }
        }
    }

    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn ledger(&self) -> LedgerConfig {
        LedgerConfig::default().with_lock_timeout(Duration::from_millis(self.lock_timeout_ms))
    }

    pub fn journal_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(JOURNAL_FILE))
    }
}
