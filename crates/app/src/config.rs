use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tradetracker_assist::AssistConfig;
use tradetracker_core::{default_categories, Category};
use tradetracker_ocr::OcrConfig;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("Invalid config {}: {source}", .path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub assist: AssistConfig,
    pub ocr: OcrConfig,
    pub categories: Vec<Category>,
}

impl AppConfig {
    /// Configured categories, or the built-in set when none are listed.
    pub fn categories(&self) -> Vec<Category> {
        if self.categories.is_empty() {
            default_categories()
        } else {
            self.categories.clone()
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "tradetracker", "TradeTracker")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

fn read(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

/// An explicit path must exist. The default location may be absent, in which
/// case defaults apply.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit {
        return read(path);
    }
    match default_config_path() {
        Some(path) if path.exists() => {
            tracing::debug!(path = %path.display(), "loading config");
            read(&path)
        }
        _ => Ok(AppConfig::default()),
    }
}
