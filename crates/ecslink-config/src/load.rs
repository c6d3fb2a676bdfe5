use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::ConfigError;
use crate::merge::merge_configs;
use crate::paths::PROJECT_CONFIG;
use crate::validate::validate;

/// Content written into a newly-created default config file.
const DEFAULT_CONFIG_CONTENT: &str = r#"# ecslink configuration
# Uncomment and edit settings below to override defaults.

# [bridge]
# endpoint = "ws://localhost:10112/"
# request_timeout_secs = 10
# connect_timeout_secs = 5

# [compiler]
# program = "/path/to/sample"
# args = []
# working_dir = "/path/to/sample/dir"
# timeout_secs = 30

# [log]
# level = "info"
# file = "/path/to/ecslink.log"
"#;

/// Load and merge configuration.
///
/// 1. Reads `config_dir/config.toml`, creating it with commented-out
///    defaults when missing.
/// 2. Looks for `.ecslink/config.toml` from `project_dir` upward.
/// 3. Merges `Config::default() <- global <- project`.
/// 4. Validates the result.
///
/// # Errors
///
/// Returns [`ConfigError`] on I/O failure, parse failure, or the first
/// validation failure.
pub fn load_config(config_dir: &Path, project_dir: Option<&Path>) -> Result<Config, ConfigError> {
    let global_path = config_dir.join("config.toml");

    if !global_path.exists() {
        std::fs::create_dir_all(config_dir)
            .and_then(|()| std::fs::write(&global_path, DEFAULT_CONFIG_CONTENT))
            .map_err(|e| ConfigError::CreateDefault(e.to_string()))?;
        tracing::info!(path = %global_path.display(), "created default config");
    }

    let mut config = Config::default();

    let global_content = std::fs::read_to_string(&global_path)?;
    if has_non_comment_content(&global_content) {
        config = merge_configs(&config, &global_content)?;
    }

    if let Some(project_path) = project_dir.and_then(find_project_config) {
        tracing::debug!(path = %project_path.display(), "applying project config");
        let project_content = std::fs::read_to_string(&project_path)?;
        config = merge_configs(&config, &project_content)?;
    }

    check(config)
}

/// Load a single config file (no default creation, no project overlay).
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

/// Parse a TOML string directly into a validated [`Config`].
pub fn load_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
    check(config)
}

fn check(config: Config) -> Result<Config, ConfigError> {
    match validate(&config) {
        Ok(()) => Ok(config),
        Err(errors) => Err(errors.into_iter().next().unwrap_or_else(|| {
            ConfigError::Validation {
                field: "unknown".to_string(),
                message: "validation failed".to_string(),
            }
        })),
    }
}

/// Walk from `start` upward looking for `.ecslink/config.toml`.
fn find_project_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG))
        .find(|candidate| candidate.is_file())
}

/// `true` when at least one line is neither blank nor a comment.
fn has_non_comment_content(content: &str) -> bool {
    content.lines().any(|l| {
        let trimmed = l.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#')
    })
}
