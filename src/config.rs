//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `$XDG_CONFIG_HOME/popcat/popcat.toml`, or the file given explicitly
//! 3. Environment variables: `POPCAT_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DEFAULT_MAX_DEPTH;

/// Raw settings for intermediate parsing (`None` → not specified, keep base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub catalog_file: Option<PathBuf>,
    pub max_depth: Option<usize>,
}

/// Unified configuration for popcat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Catalog file backing the category store
    pub catalog_file: PathBuf,
    /// Bound on ancestor-chain walks; deeper chains are reported as corruption
    pub max_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_file: default_catalog_file(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Default catalog location inside the XDG data directory.
fn default_catalog_file() -> PathBuf {
    ProjectDirs::from("", "", "popcat")
        .map(|dirs| dirs.data_dir().join("catalog.toml"))
        .unwrap_or_else(|| PathBuf::from("~/.popcat/catalog.toml"))
}

/// Get the XDG config directory for popcat.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "popcat").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("popcat.toml"))
}

/// Expand shell variables and tilde in a path string.
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_path(self.catalog_file.to_string_lossy().as_ref());
        self.catalog_file = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            catalog_file: overlay
                .catalog_file
                .clone()
                .unwrap_or_else(|| self.catalog_file.clone()),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
        }
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.max_depth == 0 {
            return Err(ApplicationError::Config {
                message: "max_depth must be at least 1".to_string(),
            });
        }
        if self.catalog_file.as_os_str().is_empty() {
            return Err(ApplicationError::Config {
                message: "catalog_file must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; replaces the global lookup and must exist
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. `config_file`, or `$XDG_CONFIG_HOME/popcat/popcat.toml` if present
    /// 3. Environment variables: `POPCAT_*` prefix
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        match config_file {
            Some(path) => {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        let raw = load_raw_settings(&global_path)?;
                        current = current.merge_with(&raw);
                    }
                }
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply POPCAT_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("POPCAT").try_parsing(true))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("catalog_file") {
            settings.catalog_file = PathBuf::from(val);
        }
        match config.get::<usize>("max_depth") {
            Ok(val) => settings.max_depth = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# popcat configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/popcat/popcat.toml  (or --config <file>)
#   Env:    POPCAT_* environment variables (explicit overrides)

# Catalog file holding the category tree
# catalog_file = "~/.local/share/popcat/catalog.toml"

# Ancestor chains longer than this are reported as corrupted data
# max_depth = 1000
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
