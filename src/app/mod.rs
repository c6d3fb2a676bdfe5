//! Command handlers behind the CLI.

mod debug;
mod ecs;
mod script;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use ecslink_bridge::{Bridge, BridgeOptions};
use ecslink_config::Config;
use ecslink_script::{Compiler, CompilerOptions};

use crate::cli::{Cli, Command};

/// Resolved settings shared by every command.
pub(crate) struct App {
    config: Config,
    endpoint: Option<String>,
}

impl App {
    pub(crate) fn new(config: Config, endpoint: Option<String>) -> Self {
        Self { config, endpoint }
    }

    fn bridge_options(&self) -> BridgeOptions {
        BridgeOptions {
            endpoint: self
                .endpoint
                .clone()
                .unwrap_or_else(|| self.config.bridge.endpoint.clone()),
            request_timeout: self.config.bridge.request_timeout(),
            connect_timeout: self.config.bridge.connect_timeout(),
        }
    }

    fn bridge(&self) -> Arc<Bridge> {
        Arc::new(Bridge::new(self.bridge_options()))
    }

    fn compiler(&self) -> Result<Compiler> {
        let compiler = &self.config.compiler;
        let program = compiler
            .program
            .clone()
            .context("no script compiler configured (set [compiler] program)")?;
        let mut options = CompilerOptions::new(program);
        options.args = compiler.args.clone();
        options.working_dir = compiler.working_dir.clone();
        options.timeout = std::time::Duration::from_secs(compiler.timeout_secs);
        Ok(Compiler::new(options))
    }

    pub(crate) async fn run(&self, cli: Cli) -> Result<()> {
        match cli.command {
            Command::Debug { op } => debug::run(self, op).await,
            Command::Listen => debug::listen(self).await,
            Command::Ecs { file, summary } => ecs::run(self, file.as_deref(), summary).await,
            Command::Complete { file, member } => script::complete(self, &file, member.as_deref()).await,
            Command::Check { file } => script::check(self, &file).await,
        }
    }
}

/// Print `value` as pretty JSON on stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to format output")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn endpoint_flag_overrides_config() {
        let app = App::new(Config::default(), Some("ws://10.1.1.1:9000/".into()));
        assert_eq!(app.bridge_options().endpoint, "ws://10.1.1.1:9000/");
    }

    #[test]
    fn bridge_options_follow_config() {
        let mut config = Config::default();
        config.bridge.request_timeout_secs = 3;
        config.bridge.connect_timeout_secs = 1;
        let opts = App::new(config, None).bridge_options();
        assert_eq!(opts.endpoint, "ws://localhost:10112/");
        assert_eq!(opts.request_timeout, Duration::from_secs(3));
        assert_eq!(opts.connect_timeout, Duration::from_secs(1));
    }

    #[test]
    fn config_defaults_match_bridge_defaults() {
        assert_eq!(
            ecslink_config::config::DEFAULT_ENDPOINT,
            ecslink_bridge::DEFAULT_ENDPOINT
        );
        let opts = App::new(Config::default(), None).bridge_options();
        assert_eq!(opts, BridgeOptions::default());
    }

    #[test]
    fn compiler_requires_program() {
        let app = App::new(Config::default(), None);
        let err = app.compiler().unwrap_err();
        assert!(err.to_string().contains("no script compiler configured"));
    }

    #[test]
    fn compiler_options_follow_config() {
        let mut config = Config::default();
        config.compiler.program = Some("sample".into());
        config.compiler.args = vec!["-q".into()];
        config.compiler.timeout_secs = 7;
        let compiler = App::new(config, None).compiler().unwrap();
        assert_eq!(compiler.options().args, vec!["-q".to_string()]);
        assert_eq!(compiler.options().timeout, Duration::from_secs(7));
    }
}
