//! Subcommand implementations.

use anyhow::{Context, Result};
use services::{AppServices, Clock};

use crate::config::{AppConfig, sqlite_file_path};

pub mod library;
pub mod seed;
pub mod status;
pub mod study;

/// Open (and migrate) the configured database.
pub async fn open(config: &AppConfig) -> Result<AppServices> {
    if let Some(path) = sqlite_file_path(&config.database_url) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let scheduler = config.scheduler()?;
    tracing::debug!(db = %config.database_url, "opening database");
    AppServices::new_sqlite(&config.database_url, Clock::default_clock(), scheduler)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))
}
