use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ecslink", version, about = "Engine command bridge, ECS resolver and script tooling")]
pub(crate) struct Cli {
    /// Websocket endpoint of the engine (overrides the config file)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Read this config file instead of the global and project ones
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Drive the script debugger of a running engine
    Debug {
        #[command(subcommand)]
        op: DebugOp,
    },
    /// Print events pushed by the engine until the connection closes
    Listen,
    /// Resolve which systems run on which templates
    Ecs {
        /// Read the payload from a JSON or BSON file instead of the engine
        #[arg(long)]
        file: Option<PathBuf>,
        /// Print a readable summary instead of JSON
        #[arg(long)]
        summary: bool,
    },
    /// List completions for a script
    Complete {
        file: PathBuf,
        /// List members of this type instead of global names
        #[arg(long)]
        member: Option<String>,
    },
    /// Compile a script and print its diagnostics
    Check { file: PathBuf },
}

#[derive(Debug, Subcommand)]
pub(crate) enum DebugOp {
    /// Turn breakpoint handling on
    Enable,
    /// Set a breakpoint
    Break { file: PathBuf, line: i64 },
    /// Remove a breakpoint
    Unbreak { file: PathBuf, line: i64 },
    /// Remove every breakpoint
    Clear,
    /// Continue execution
    Resume,
    /// Single step
    Step,
    /// Step into the next call
    StepIn,
    /// Step out of the current function
    StepOut,
    /// Step over the next call
    StepOver,
    /// Print the local variables of the current frame
    Locals,
    /// Print call stack frames [START, END)
    Stack {
        #[arg(default_value_t = 0)]
        start: usize,
        #[arg(default_value_t = usize::MAX)]
        end: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_breakpoint_with_global_endpoint() {
        let cli = Cli::try_parse_from([
            "ecslink",
            "debug",
            "break",
            "script.as",
            "12",
            "--endpoint",
            "ws://127.0.0.1:4000/",
        ])
        .unwrap();
        assert_eq!(cli.endpoint.as_deref(), Some("ws://127.0.0.1:4000/"));
        match cli.command {
            Command::Debug {
                op: DebugOp::Break { file, line },
            } => {
                assert_eq!(file, PathBuf::from("script.as"));
                assert_eq!(line, 12);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn stack_range_defaults_to_everything() {
        let cli = Cli::try_parse_from(["ecslink", "debug", "stack"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Debug {
                op: DebugOp::Stack { start: 0, end: usize::MAX }
            }
        ));
    }

    #[test]
    fn step_in_is_kebab_case() {
        let cli = Cli::try_parse_from(["ecslink", "debug", "step-in"]).unwrap();
        assert!(matches!(cli.command, Command::Debug { op: DebugOp::StepIn }));
    }

    #[test]
    fn ecs_accepts_file_and_summary() {
        let cli = Cli::try_parse_from(["ecslink", "ecs", "--file", "data.bson", "--summary"]).unwrap();
        match cli.command {
            Command::Ecs { file, summary } => {
                assert_eq!(file, Some(PathBuf::from("data.bson")));
                assert!(summary);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn complete_member() {
        let cli = Cli::try_parse_from(["ecslink", "complete", "script.as", "--member", "vec3"]).unwrap();
        assert!(matches!(cli.command, Command::Complete { member: Some(ref m), .. } if m == "vec3"));
    }
}
