use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Websocket endpoint of a locally running engine.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:10112/";

/// Log verbosity level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Most verbose.
    Trace,
    /// Traffic and routing decisions.
    Debug,
    /// Connection lifecycle (default).
    #[default]
    Info,
    /// Dropped frames and failed requests.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Connection to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Websocket URL (`ws://` or `wss://`).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Seconds a command waits for its reply (1–300).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Seconds a connection attempt may take (1–300).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_connect_timeout() -> u64 {
    5
}

impl BridgeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// The external script compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Compiler executable. Commands that need it fail when unset.
    #[serde(default)]
    pub program: Option<PathBuf>,
    /// Extra arguments placed before `--compile`/`--inspect`.
    #[serde(default)]
    pub args: Vec<String>,
    /// Directory the compiler runs in.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Seconds one compiler run may take (1–300).
    #[serde(default = "default_compile_timeout")]
    pub timeout_secs: u64,
}

fn default_compile_timeout() -> u64 {
    30
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: Vec::new(),
            working_dir: None,
            timeout_secs: default_compile_timeout(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log verbosity level, overridden by `RUST_LOG`.
    #[serde(default)]
    pub level: LogLevel,
    /// Write logs to this file instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Top-level ecslink configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = Config::default();
        assert_eq!(cfg.bridge.endpoint, "ws://localhost:10112/");
        assert_eq!(cfg.bridge.request_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.bridge.connect_timeout(), Duration::from_secs(5));
        assert!(cfg.compiler.program.is_none());
        assert!(cfg.compiler.args.is_empty());
        assert_eq!(cfg.compiler.timeout_secs, 30);
        assert_eq!(cfg.log.level, LogLevel::Info);
        assert!(cfg.log.file.is_none());
    }

    #[test]
    fn parse_from_toml_string() {
        let input = r#"
[bridge]
endpoint = "ws://10.0.0.5:10112/"

[compiler]
program = "/opt/engine/sample"
working_dir = "/opt/engine"

[log]
level = "debug"
"#;
        let cfg: Config = toml::from_str(input).expect("parse toml");
        assert_eq!(cfg.bridge.endpoint, "ws://10.0.0.5:10112/");
        assert_eq!(cfg.bridge.request_timeout_secs, 10);
        assert_eq!(cfg.compiler.program, Some(PathBuf::from("/opt/engine/sample")));
        assert_eq!(cfg.compiler.working_dir, Some(PathBuf::from("/opt/engine")));
        assert_eq!(cfg.log.level, LogLevel::Debug);
    }

    #[test]
    fn serde_roundtrip_preserves_values() {
        let cfg = Config {
            bridge: BridgeConfig {
                endpoint: "wss://engine.local/".into(),
                request_timeout_secs: 60,
                connect_timeout_secs: 2,
            },
            compiler: CompilerConfig {
                program: Some(PathBuf::from("sample")),
                args: vec!["--quiet".into()],
                working_dir: None,
                timeout_secs: 5,
            },
            log: LogConfig {
                level: LogLevel::Trace,
                file: Some(PathBuf::from("/tmp/ecslink.log")),
            },
        };
        let text = toml::to_string(&cfg).expect("serialize");
        let back: Config = toml::from_str(&text).expect("deserialize");
        assert_eq!(back, cfg);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg: Config = toml::from_str("").expect("parse empty toml");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn log_level_names() {
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::default().as_str(), "info");
    }
}
