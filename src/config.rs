//! Shell configuration
//!
//! Loads [`ShellConfig`] from YAML. Every field has a default, so a file only
//! needs to name what it changes:
//!
//! ```yaml
//! prompt_stop: "$"
//! prompt_path_separator: "/"
//! history:
//!   capacity: 200
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "NESTSHELL_CONFIG";

/// Looked up relative to the working directory when no override is set
pub const DEFAULT_CONFIG_PATH: &str = "config/nestshell.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Appended to the scope prompt path
    pub prompt_stop: String,
    /// Fallback separator when the top scope defines none
    pub prompt_path_separator: Option<String>,
    pub help: HelpConfig,
    pub history: HistoryConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt_stop: ">".to_string(),
            prompt_path_separator: None,
            help: HelpConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpConfig {
    pub enabled: bool,
    pub command: String,
    /// `add --help` renders the detail help of `add`
    pub parameter: Option<String>,
    pub placeholder: String,
    pub footer: bool,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "help".to_string(),
            parameter: Some("help".to_string()),
            placeholder: "no description available".to_string(),
            footer: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub capacity: usize,
    /// Listing command, intercepted before dispatch
    pub command: String,
    /// One history for all front-ends instead of one each
    pub shared: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 1000,
            command: "history".to_string(),
            shared: false,
        }
    }
}

impl ShellConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: ShellConfig =
            serde_yaml::from_str(content).context("Failed to parse shell configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.help.enabled && self.help.command.trim().is_empty() {
            bail!("help.command must not be empty when help is enabled");
        }
        if self.history.enabled {
            if self.history.capacity == 0 {
                bail!("history.capacity must be at least 1");
            }
            if self.history.command.trim().is_empty() {
                bail!("history.command must not be empty when history is enabled");
            }
        }
        Ok(())
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Resolves and loads the configuration file
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
    explicit: bool,
}

impl ConfigLoader {
    /// Loader for an explicit file; a missing file is an error.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            explicit: true,
        }
    }

    /// Create loader from NESTSHELL_CONFIG or default to config/nestshell.yaml
    ///
    /// Only the environment override is explicit; a missing default file
    /// falls back to built-in defaults.
    pub fn from_env() -> Self {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::new(path),
            _ => Self {
                path: PathBuf::from(DEFAULT_CONFIG_PATH),
                explicit: false,
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn load(&self) -> Result<ShellConfig> {
        if !self.path.exists() {
            if self.explicit {
                bail!("Configuration file {} does not exist", self.path.display());
            }
            info!(
                "No configuration at {}, using defaults",
                self.path.display()
            );
            return Ok(ShellConfig::default());
        }

        info!("Loading shell configuration from {}", self.path.display());
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        ShellConfig::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", self.path.display()))
    }
}
