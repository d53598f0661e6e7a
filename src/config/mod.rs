//! Configuration module for plyr-rs
//!
//! Configuration decides which discovered plugins are active, overrides their
//! priorities, and bounds dispatch recursion. The engine itself only consumes
//! the resolved values.
//!
//! # Config Location
//!
//! [`PlyrConfig::load_or_default`] reads `plyr.toml` from the platform config
//! directory:
//! - **Linux**: `~/.config/plyr-rs/plyr.toml`
//! - **macOS**: `~/Library/Application Support/plyr-rs/plyr.toml`
//! - **Windows**: `%APPDATA%\plyr-rs\plyr.toml`
//!
//! # Example
//!
//! ```toml
//! [dispatch]
//! max_depth = 32
//!
//! [plugins.vector]
//! priority = 20
//!
//! [plugins.legacy_frames]
//! enabled = false
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{PlyrError, Result, ResultExt};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform config directory
pub const APP_DIR: &str = "plyr-rs";

/// Config filename
pub const CONFIG_FILE: &str = "plyr.toml";

/// Get the path to the default config file
pub fn config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_DIR).join(CONFIG_FILE))
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlyrConfig {
    /// Dispatch limits
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Per-plugin overrides, keyed by plugin name
    #[serde(default)]
    pub plugins: IndexMap<String, PluginOverride>,
}

impl PlyrConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PlyrError::Config(format!("Failed to parse TOML config: {}", e)))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| PlyrError::Config(format!("Failed to parse JSON config: {}", e)))
    }

    /// Load from a file; `.json` files are parsed as JSON, everything else as TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(PlyrError::from)
            .with_context(|| format!("Failed to read config {:?}", path))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Load the default config file, returning defaults if it is missing or invalid
    pub fn load_or_default() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| PlyrError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Save as TOML, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(PlyrError::from)
                    .context("Failed to create config directory")?;
            }
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Override for a plugin, if any
    pub fn plugin(&self, name: &str) -> Option<&PluginOverride> {
        self.plugins.get(name)
    }

    /// Set or replace the override for a plugin
    pub fn set_plugin(&mut self, name: impl Into<String>, plugin: PluginOverride) {
        self.plugins.insert(name.into(), plugin);
    }
}
