use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Optional settings file, looked up under the checked-out workspace.
const WORKSPACE_CONFIG: &str = ".github/pr-assist.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub retry: RetryConfig,
    pub model: ModelConfig,
    pub unit_test: UnitTestConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Extra attempts after the first failure.
    pub max_retries: u32,
    /// Fixed pause between attempts.
    pub delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitTestConfig {
    /// Upper bound on source files sent for test generation per run.
    pub max_files: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 5000,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.2,
        }
    }
}

impl Default for UnitTestConfig {
    fn default() -> Self {
        Self { max_files: 10 }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Config {
    /// Load settings from `explicit`, or from the workspace settings file when
    /// it exists, or fall back to defaults.
    ///
    /// An explicit path that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::workspace_config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn workspace_config_path() -> Option<PathBuf> {
        let root = env::var_os("GITHUB_WORKSPACE")
            .map(PathBuf::from)
            .or_else(|| env::current_dir().ok())?;
        Some(root.join(WORKSPACE_CONFIG))
    }
}
