//! Subtally Core - subscription records and spend summation
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Subscription, Month, filters)
//! - **ports**: Trait definitions for external dependencies (Repository, EventObserver)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB, in-memory)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod migrations;
pub mod log_migrations;
pub mod request;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::duckdb::DuckDbRepository;
use config::Config;
use ports::EventObserver;
use services::SubscriptionService;

// Re-export commonly used types at crate root
pub use domain::{CreateInput, ListFilter, Month, Subscription, SummaryFilter, UpdateInput};
pub use domain::result::Error;
pub use request::RequestContext;
pub use services::{EntryPoint, LogEntry, LogEvent, LogLevel, LoggingService, MigrationResult};

/// Main context for Subtally operations
///
/// Holds the configuration, the database-backed repository and the
/// subscription service wired to it.
pub struct SubtallyContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub subscription_service: SubscriptionService<DuckDbRepository>,
    /// Migrations applied while opening the database
    pub migrations: MigrationResult,
}

impl SubtallyContext {
    /// Open the database in `data_dir`, apply pending migrations and wire services
    pub fn new(data_dir: &Path, observer: Arc<dyn EventObserver>) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let db_path = config.database_path(data_dir);

        let repository = Arc::new(
            DuckDbRepository::new(&db_path)
                .with_context(|| format!("Failed to open database {}", db_path.display()))?,
        );
        let migrations = repository
            .run_migrations()
            .context("Failed to apply schema migrations")?;

        let subscription_service =
            SubscriptionService::with_observer(Arc::clone(&repository), observer);

        Ok(Self {
            config,
            repository,
            subscription_service,
            migrations,
        })
    }

    /// Request context bounded by the configured timeout, cancelled with `parent`
    pub fn request_context(&self, parent: &RequestContext) -> RequestContext {
        parent.child_with_timeout(self.config.request_timeout)
    }
}
