//! CLI command implementations

pub mod add;
pub mod delete;
pub mod get;
pub mod list;
pub mod logs;
pub mod migrate;
pub mod summary;
pub mod update;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use subtally_core::config::Config;
use subtally_core::ports::{EventObserver, NoopObserver};
use subtally_core::{
    EntryPoint, Error, LogLevel, LoggingService, Month, RequestContext, SubtallyContext,
};

/// Per-invocation state shared by every command
pub struct Session {
    /// Cancelled on Ctrl-C; every request context derives from it
    pub root: RequestContext,
    pub logger: Option<Arc<LoggingService>>,
}

impl Session {
    pub fn context(&self) -> Result<SubtallyContext> {
        get_context(self.logger.clone())
    }
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<Arc<LoggingService>> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    let level = Config::load(&data_dir)
        .map(|c| c.min_log_level())
        .unwrap_or(LogLevel::Debug);
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
        .ok()
        .map(|service| Arc::new(service.with_min_level(level)))
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SUBTALLY_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".subtally"))
        .ok_or_else(|| anyhow!("Could not find home directory; set SUBTALLY_DIR"))
}

/// Build the subtally context, reporting service events to `logger`
pub fn get_context(logger: Option<Arc<LoggingService>>) -> Result<SubtallyContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let observer: Arc<dyn EventObserver> = match logger {
        Some(logger) => logger,
        None => Arc::new(NoopObserver),
    };

    SubtallyContext::new(&data_dir, observer).context("Failed to initialize subtally context")
}

/// Parse a `MM-YYYY` month argument
pub fn parse_month(s: &str) -> std::result::Result<Month, Error> {
    let invalid = || Error::validation(format!("invalid month '{}', expected MM-YYYY", s));

    let (month, year) = s.trim().split_once('-').ok_or_else(invalid)?;
    let digits = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
    if !digits(month, 2) || !digits(year, 4) {
        return Err(invalid());
    }
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    Month::new(year, month).map_err(|_| invalid())
}
