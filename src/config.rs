use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for forksync
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Directory clone targets are created under; clone layout is
    /// `<base_directory>/<upstream-owner>/<name>`
    #[serde(default = "default_base_directory")]
    pub base_directory: String,

    /// GitHub authentication and API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Synchronization behavior settings
    #[serde(default)]
    pub sync: SyncConfig,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitHubConfig {
    /// REST API base URL; overridable so tests can target a mock server
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Authentication method
    #[serde(default = "default_auth_method")]
    pub auth_method: String, // "auto", "gh_cli", "token"

    /// GitHub username (auto-detected if null)
    pub username: Option<String>,
}

/// Synchronization configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncConfig {
    /// Branch that fetch/checkout/merge/push operate on
    #[serde(default = "default_primary_branch")]
    pub primary_branch: String,

    /// Attempts for the read-only network lookups (repository metadata).
    /// Local git operations are never retried.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between retry attempts, in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

// Default value functions
fn default_base_directory() -> String {
    ".".to_string()
}
fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_auth_method() -> String {
    "auto".to_string()
}
fn default_primary_branch() -> String {
    "master".to_string()
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    2
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auth_method: default_auth_method(),
            username: None,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            primary_branch: default_primary_branch(),
            retry_attempts: default_retry_attempts(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_directory: default_base_directory(),
            github: GitHubConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location or fall back to defaults
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        // Expand environment variables in paths
        config.expand_paths()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("forksync").join("config.yml"))
    }

    /// Expand environment variables in configuration paths
    pub fn expand_paths(&mut self) -> Result<()> {
        self.base_directory = shellexpand::full(&self.base_directory)
            .context("Failed to expand base_directory path")?
            .into_owned();

        Ok(())
    }
}
