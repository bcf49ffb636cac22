//! Configuration resolution: defaults, then TOML, then environment, then flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vocab_core::model::LEVEL_COUNT;
use vocab_core::scheduler::{DEFAULT_INTERVAL_DAYS, LapsePolicy, Scheduler};

pub const DEFAULT_CONFIG_FILE: &str = "flashvocab.toml";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://flashvocab.sqlite3";
pub const DB_URL_ENV: &str = "FLASHVOCAB_DB_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database_url: String,
    pub scheduler: SchedulerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    pub intervals_days: [u32; LEVEL_COUNT],
    pub lapse_policy: LapsePolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            intervals_days: DEFAULT_INTERVAL_DAYS,
            lapse_policy: LapsePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Resolve the effective configuration.
    ///
    /// An explicit `config_path` must exist. Without one, `flashvocab.toml` in
    /// the current directory is used when present.
    pub fn load(config_path: Option<&Path>, db_flag: Option<&str>) -> Result<Self> {
        let path = match config_path {
            Some(p) if p.exists() => Some(p.to_path_buf()),
            Some(p) => anyhow::bail!("config file not found: {}", p.display()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        };

        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config: {}", path.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("failed to parse config: {}", path.display()))?
            }
            None => Self::default(),
        };

        let env_url = std::env::var(DB_URL_ENV).ok();
        config.apply_overrides(env_url.as_deref(), db_flag);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Environment first, then the flag, so the flag wins. Blank values are ignored.
    pub fn apply_overrides(&mut self, env_url: Option<&str>, db_flag: Option<&str>) {
        for url in [env_url, db_flag].into_iter().flatten() {
            if !url.trim().is_empty() {
                self.database_url = url.to_string();
            }
        }
        self.database_url = normalize_sqlite_url(&self.database_url);
    }

    /// Build the scheduler, validating the configured intervals.
    pub fn scheduler(&self) -> Result<Scheduler> {
        let scheduler = Scheduler::try_with_intervals(self.scheduler.intervals_days)
            .context("invalid [scheduler] intervals_days")?;
        Ok(scheduler.with_lapse_policy(self.scheduler.lapse_policy))
    }
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL that
/// creates the file on first use.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite:file:") {
        return trimmed.to_string();
    }

    let without_scheme = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path_str, query) = match without_scheme.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (without_scheme, None),
    };

    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };

    let query = match query {
        Some(q) if q.contains("mode=") => q.to_string(),
        Some(q) if !q.is_empty() => format!("{q}&mode=rwc"),
        _ => "mode=rwc".to_string(),
    };
    format!("sqlite://{}?{query}", absolute.display())
}

/// Filesystem path behind a normalized file URL, if there is one.
#[must_use]
pub fn sqlite_file_path(db_url: &str) -> Option<PathBuf> {
    let path = db_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or(path);
    (!path.is_empty()).then(|| PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.scheduler.intervals_days, [1, 3, 7, 14, 30]);
        assert_eq!(config.scheduler.lapse_policy, LapsePolicy::Demote);
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [scheduler]
            lapse_policy = "reset"
            "#,
        )
        .unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.scheduler.lapse_policy, LapsePolicy::Reset);
        assert_eq!(config.scheduler.intervals_days, DEFAULT_INTERVAL_DAYS);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppConfig::from_toml("databse_url = \"typo\"").is_err());
    }

    #[test]
    fn decreasing_intervals_fail_validation() {
        let config = AppConfig::from_toml(
            r"
            [scheduler]
            intervals_days = [1, 3, 2, 14, 30]
            ",
        )
        .unwrap();
        assert!(config.scheduler().is_err());

        let scheduler = AppConfig::default().scheduler().unwrap();
        assert_eq!(scheduler.interval_days(), DEFAULT_INTERVAL_DAYS);
    }

    #[test]
    fn flag_overrides_env_and_blank_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some("sqlite:///tmp/env.db"), Some("/tmp/flag.db"));
        assert_eq!(config.database_url, "sqlite:///tmp/flag.db?mode=rwc");

        let mut config = AppConfig::default();
        config.apply_overrides(Some("/tmp/env.db"), Some("  "));
        assert_eq!(config.database_url, "sqlite:///tmp/env.db?mode=rwc");
    }

    #[test]
    fn normalize_keeps_memory_urls_and_existing_mode() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:file:db?mode=memory&cache=shared"),
            "sqlite:file:db?mode=memory&cache=shared"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:///data/v.db?mode=ro"),
            "sqlite:///data/v.db?mode=ro"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:/data/v.db?cache=shared"),
            "sqlite:///data/v.db?cache=shared&mode=rwc"
        );
    }

    #[test]
    fn relative_paths_become_absolute() {
        let url = normalize_sqlite_url("vocab.sqlite3");
        let path = sqlite_file_path(&url).unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("vocab.sqlite3"));
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
    }
}
