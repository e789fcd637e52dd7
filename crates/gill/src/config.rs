//! Configuration system for gill.
//!
//! Loads config from:
//! 1. Global: ~/.config/gill/config.toml
//! 2. Per-project: .gill/config.toml (overrides global)
//!
//! Language server clients can layer the same structure on top as JSON
//! (`initializationOptions` or `workspace/didChangeConfiguration`).
//!
//! Example config.toml:
//! ```toml
//! [tools]
//! fish = "/opt/homebrew/bin/fish"
//! fish_indent = "/opt/homebrew/bin/fish_indent"
//! timeout_ms = 5000           # 0 disables the timeout
//!
//! [lint]
//! on_open = true
//! on_save = true
//! on_change = false           # lint unsaved buffers as you type
//! debounce_ms = 300
//!
//! [format]
//! enabled = true
//!
//! [pretty]
//! colors = "auto"             # "auto", "always", or "never"
//! ```

use crate::output::PrettyConfig;
use crate::serve::{FormatConfig, LintConfig};
use gill_core::Merge;
use gill_derive::Merge;
use gill_tools::ToolsConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid client settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Executables used for linting and formatting.
#[derive(Debug, Clone, Deserialize, Default, Merge, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsSection {
    /// Path or name of the fish binary. Default: "fish"
    pub fish: Option<PathBuf>,
    /// Path or name of the fish_indent binary. Default: "fish_indent"
    pub fish_indent: Option<PathBuf>,
    /// Kill a tool after this many milliseconds (0 = never). Default: 10000
    pub timeout_ms: Option<u64>,
}

impl ToolsSection {
    pub fn to_tools_config(&self) -> ToolsConfig {
        let defaults = ToolsConfig::default();
        ToolsConfig {
            fish: self.fish.clone().unwrap_or(defaults.fish),
            fish_indent: self.fish_indent.clone().unwrap_or(defaults.fish_indent),
            timeout: match self.timeout_ms {
                Some(0) => None,
                Some(ms) => Some(Duration::from_millis(ms)),
                None => defaults.timeout,
            },
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, Merge, PartialEq)]
#[serde(default)]
pub struct GillConfig {
    pub tools: ToolsSection,
    pub lint: LintConfig,
    pub format: FormatConfig,
    pub pretty: PrettyConfig,
}

impl GillConfig {
    /// Load configuration for a project.
    ///
    /// Loads global config, then merges the per-project config over it.
    /// Unreadable or invalid files are skipped with a warning.
    pub fn load(root: &Path) -> Self {
        let mut config = Self::default();

        let global = gill_core::global_config_dir().map(|d| d.join("config.toml"));
        let project = gill_core::project_config_dir(root).join("config.toml");

        for path in global.into_iter().chain(std::iter::once(project)) {
            match Self::load_file(&path) {
                Ok(Some(layer)) => {
                    tracing::debug!(path = %path.display(), "loaded config");
                    config = config.merge(layer);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("{e}"),
            }
        }

        config
    }

    /// Load one config file. Missing files are `Ok(None)`.
    pub fn load_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Parse client-supplied settings, accepting an optional `gill` wrapper.
    pub fn from_client_settings(value: &serde_json::Value) -> Result<Self, ConfigError> {
        let value = value.get("gill").unwrap_or(value);
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value.clone())?)
    }
}
