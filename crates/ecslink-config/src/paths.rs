//! Standard directories for ecslink.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Application directory name under the platform config root.
pub const APP_DIR: &str = "ecslink";

/// Per-project overlay location, relative to a project root.
pub const PROJECT_CONFIG: &str = ".ecslink/config.toml";

/// Directories ecslink reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the platform config directory via `dirs`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Path` if neither the platform config directory
    /// nor the home directory can be determined.
    pub fn detect() -> Result<Self, ConfigError> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|root| Self::with_root(&root))
            .ok_or_else(|| ConfigError::Path("could not determine config directory".into()))
    }

    /// Build paths under an explicit config root.
    pub fn with_root(config_root: &Path) -> Self {
        Self {
            config_dir: config_root.join(APP_DIR),
        }
    }

    /// Directory holding the global `config.toml`.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}
