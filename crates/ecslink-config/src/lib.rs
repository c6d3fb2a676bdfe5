//! ecslink-config: layered TOML configuration and logging helpers.
pub mod config;
pub mod error;
pub mod load;
pub mod logging;
pub mod merge;
pub mod paths;
pub mod validate;

pub use config::{BridgeConfig, CompilerConfig, Config, LogConfig, LogLevel};
pub use error::ConfigError;
pub use load::{load_config, load_file, load_from_str};
pub use paths::AppPaths;
