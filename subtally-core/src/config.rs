//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": { "env": "local", "databaseFile": "subtally.duckdb", "requestTimeoutSecs": 5 }
//! }
//! ```
//! The file is read-only to the application; unknown keys are ignored.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::result::Error;
use crate::services::LogLevel;

pub const DEFAULT_DATABASE_FILE: &str = "subtally.duckdb";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

const ENV_VAR: &str = "SUBTALLY_ENV";
const TIMEOUT_VAR: &str = "SUBTALLY_REQUEST_TIMEOUT_SECS";

/// Deployment environment, selects the log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(Error::Config(format!(
                "unknown environment '{}', expected local, dev or prod",
                other
            ))),
        }
    }
}

/// Raw settings.json structure
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    env: Option<Environment>,
    #[serde(default)]
    database_file: Option<String>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
}

/// Subtally configuration (resolved view of settings plus env overrides)
#[derive(Debug, Clone)]
pub struct Config {
    pub env: Environment,
    pub database_file: String,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: Environment::default(),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// Missing file or fields fall back to defaults. `SUBTALLY_ENV` and
    /// `SUBTALLY_REQUEST_TIMEOUT_SECS` override the file.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings in {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };

        let env = match std::env::var(ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => value
                .parse::<Environment>()
                .with_context(|| format!("Invalid {}", ENV_VAR))?,
            _ => raw.app.env.unwrap_or_default(),
        };

        let timeout_secs = match std::env::var(TIMEOUT_VAR) {
            Ok(value) if !value.trim().is_empty() => value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid {}: '{}'", TIMEOUT_VAR, value))?,
            _ => raw
                .app
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let database_file = raw
            .app
            .database_file
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_FILE.to_string());

        Ok(Self {
            env,
            database_file,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Path of the subscription database inside `data_dir`
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.database_file)
    }

    /// Least severe event level that reaches the log
    pub fn min_log_level(&self) -> LogLevel {
        match self.env {
            Environment::Local | Environment::Dev => LogLevel::Debug,
            Environment::Prod => LogLevel::Info,
        }
    }
}
