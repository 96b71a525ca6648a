//! Configuration loader with tier-based merging.
//!
//! Tiers, lowest priority first: embedded defaults, project
//! `./day-planner/config.yaml`, user `~/.day-planner/config.yaml`, then
//! environment variables.

use super::merge::merge_tiers;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Paths for each configuration tier.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        let user_dir = std::env::var("DAY_PLANNER_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".day-planner")));

        let project_dir = std::env::var("DAY_PLANNER_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("day-planner")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Highest-priority config file that contributed, if any
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration with explicit paths.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        if let Ok(explicit_path) = std::env::var("DAY_PLANNER_CONFIG_PATH") {
            return Self::load_file(explicit_path, paths);
        }

        let mut tiers: Vec<Value> = vec![
            serde_json::to_value(Config::default()).context("encoding default config")?,
        ];
        let mut config_path = None;

        for dir in [paths.project_dir.as_deref(), paths.user_dir.as_deref()]
            .into_iter()
            .flatten()
        {
            if let Some(value) = read_yaml_tier(&dir.join("config.yaml")) {
                tiers.push(value);
                config_path = Some(dir.join("config.yaml"));
            }
        }

        let mut config: Config =
            serde_json::from_value(merge_tiers(tiers)).context("merging config tiers")?;
        Self::apply_env_overrides(&mut config);

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    /// Load a single explicit config file. It replaces the file tiers
    /// entirely; environment overrides still apply.
    pub fn load_file(path: impl Into<PathBuf>, paths: ConfigPaths) -> Result<Self> {
        let path = path.into();
        let mut config = Config::load(&path)?;
        Self::apply_env_overrides(&mut config);
        Ok(Self {
            paths,
            config,
            config_path: Some(path),
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut Config) {
        if let Ok(db_path) = std::env::var("DAY_PLANNER_DB_PATH") {
            config.storage.db_path = PathBuf::from(db_path);
        }

        if let Ok(key) = std::env::var("DAY_PLANNER_STORAGE_KEY") {
            config.storage.key = key;
        }

        if let Ok(endpoint) = std::env::var("DAY_PLANNER_ENDPOINT") {
            config.classifier.endpoint = endpoint;
        }

        if let Ok(model) = std::env::var("DAY_PLANNER_MODEL") {
            config.classifier.model = model;
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Get the config file path that was used.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

/// Read one YAML tier. Missing files are skipped quietly; unreadable or
/// malformed ones are skipped with a warning.
fn read_yaml_tier(path: &Path) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable config file");
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!(path = %path.display(), "Loaded config tier");
            Some(value)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping malformed config file");
            None
        }
    }
}
