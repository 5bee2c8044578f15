//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Compiled-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config (./onboarding/)
    Project = 1,
    /// User-level config (~/.onboarding/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
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
        // User dir: ONBOARDING_USER_DIR or ~/.onboarding
        let user_dir = std::env::var("ONBOARDING_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".onboarding")));

        // Project dir: ONBOARDING_PROJECT_DIR or $CWD/onboarding
        let project_dir = std::env::var("ONBOARDING_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("onboarding")));

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

/// Read a YAML file into a JSON value for merging. Unreadable or malformed files are
/// skipped with a warning.
fn read_tier(path: &Path, tier: ConfigTier) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), %tier, error = %e, "cannot read config file");
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!(path = %path.display(), %tier, "loaded config tier");
            Some(value)
        }
        Err(e) => {
            warn!(path = %path.display(), %tier, error = %e, "ignoring malformed config file");
            None
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
    /// Load configuration from all tiers. `ONBOARDING_CONFIG_PATH` bypasses discovery.
    pub fn load() -> Result<Self> {
        if let Ok(explicit_path) = std::env::var("ONBOARDING_CONFIG_PATH") {
            return Self::load_explicit(PathBuf::from(explicit_path));
        }
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load a single explicit file on top of the defaults.
    pub fn load_explicit(path: PathBuf) -> Result<Self> {
        let mut config = Config::load(&path)
            .with_context(|| format!("failed to load config file {}", path.display()))?;
        Self::apply_env_overrides(&mut config);
        Ok(Self {
            paths: ConfigPaths::with_dirs(None, None),
            config,
            config_path: Some(path),
        })
    }

    /// Load configuration with explicit tier directories.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let mut configs: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut config_path = None;

        for (dir, tier) in [
            (paths.project_dir.as_ref(), ConfigTier::Project),
            (paths.user_dir.as_ref(), ConfigTier::User),
        ] {
            let Some(dir) = dir else { continue };
            let file = dir.join("config.yaml");
            if let Some(value) = read_tier(&file, tier) {
                configs.push(value);
                config_path = Some(file);
            }
        }

        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        Self::apply_env_overrides(&mut config);

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut Config) {
        if let Ok(db_path) = std::env::var("ONBOARDING_DB_PATH") {
            debug!(tier = %ConfigTier::Environment, db_path = %db_path, "overriding database path");
            config.server.db_path = PathBuf::from(db_path);
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_paths(paths).unwrap();

        assert_eq!(loader.config().onboarding.default_priority, 1);
        assert!(loader.config().onboarding.default_due_days.is_none());
        assert!(loader.config_path().is_none());
    }

    #[test]
    fn test_project_config_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("onboarding");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(
            project_dir.join("config.yaml"),
            "onboarding:\n  default_due_days: 14\n",
        )
        .unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir.clone()), Some(temp.path().join("user")));
        let loader = ConfigLoader::load_with_paths(paths).unwrap();

        assert_eq!(loader.config().onboarding.default_due_days, Some(14));
        assert_eq!(loader.config().onboarding.default_priority, 1);
        assert_eq!(loader.config_path(), Some(project_dir.join("config.yaml").as_path()));
    }

    #[test]
    fn test_user_config_overrides_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("onboarding");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        std::fs::write(
            project_dir.join("config.yaml"),
            "onboarding:\n  default_priority: 2\n  default_category: it\n",
        )
        .unwrap();
        std::fs::write(user_dir.join("config.yaml"), "onboarding:\n  default_priority: 3\n").unwrap();

        let loader =
            ConfigLoader::load_with_paths(ConfigPaths::with_dirs(Some(project_dir), Some(user_dir)))
                .unwrap();

        assert_eq!(loader.config().onboarding.default_priority, 3);
        assert_eq!(loader.config().onboarding.default_category.as_deref(), Some("it"));
    }

    #[test]
    fn test_malformed_tier_is_skipped() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("onboarding");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("config.yaml"), "onboarding: [unterminated").unwrap();

        let loader =
            ConfigLoader::load_with_paths(ConfigPaths::with_dirs(Some(project_dir), None)).unwrap();

        assert_eq!(loader.config().onboarding.default_priority, 1);
        assert!(loader.config_path().is_none());
    }

    #[test]
    fn test_explicit_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("custom.yaml");
        std::fs::write(&file, "onboarding:\n  default_category: general\n").unwrap();

        let loader = ConfigLoader::load_explicit(file.clone()).unwrap();

        assert_eq!(loader.config().onboarding.default_category.as_deref(), Some("general"));
        assert_eq!(loader.config_path(), Some(file.as_path()));
    }
}
