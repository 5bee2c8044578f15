//! Configuration types and structures.

use crate::format::OutputFormat;
use crate::types::{PRIORITY_DEFAULT, Priority};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub onboarding: OnboardingConfig,
}

/// Storage and output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Default output format for command results (json or markdown).
    #[serde(default)]
    pub default_format: OutputFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            default_format: OutputFormat::default(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("onboarding/onboarding.db")
}

/// Defaults used while customizing and applying templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingConfig {
    /// Priority given to blank drafts.
    #[serde(default = "default_priority")]
    pub default_priority: Priority,

    /// Category given to blank drafts.
    #[serde(default)]
    pub default_category: Option<String>,

    /// When neither the task nor the request carries a due date, tasks fall due
    /// this many days after the new hire's start date.
    #[serde(default)]
    pub default_due_days: Option<u64>,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
            default_category: None,
            default_due_days: None,
        }
    }
}

fn default_priority() -> Priority {
    PRIORITY_DEFAULT
}

impl Config {
    /// Load configuration from a single YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        // Empty or comment-only files parse as null
        let config: Option<Config> = serde_yaml::from_str(&content)?;
        Ok(config.unwrap_or_default())
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
