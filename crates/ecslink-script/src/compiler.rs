//! Runs the external script compiler and parses its report.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::error::ScriptError;
use crate::report::CompileReport;

/// Default ceiling for one compiler run (milliseconds).
pub const DEFAULT_COMPILE_TIMEOUT_MS: u64 = 30_000;

/// What the compiler should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    /// Diagnostics and the module's own symbols.
    Compile,
    /// Same as `Compile` plus the native bindings.
    Inspect,
}

impl CompileMode {
    pub fn flag(self) -> &'static str {
        match self {
            Self::Compile => "--compile",
            Self::Inspect => "--inspect",
        }
    }
}

/// How to invoke the compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    /// Compiler executable.
    pub program: PathBuf,
    /// Arguments placed before the mode flag.
    pub args: Vec<String>,
    /// Directory the compiler runs in; the current one when `None`.
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl CompilerOptions {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout: Duration::from_millis(DEFAULT_COMPILE_TIMEOUT_MS),
        }
    }
}

/// Handle on the compiler executable.
#[derive(Debug, Clone)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Run `<program> [args..] <mode flag> <file>` and parse stdout.
    ///
    /// The exit status is not checked: the compiler exits non-zero on
    /// script errors but still prints a full report.
    pub async fn run(&self, mode: CompileMode, file: &Path) -> Result<CompileReport, ScriptError> {
        let mut cmd = TokioCommand::new(&self.options.program);
        cmd.args(&self.options.args)
            .arg(mode.flag())
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.options.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(
            program = %self.options.program.display(),
            mode = mode.flag(),
            file = %file.display(),
            "running compiler"
        );

        let child = cmd.spawn().map_err(|e| {
            ScriptError::SpawnFailed(format!("{}: {}", self.options.program.display(), e))
        })?;

        let output = timeout(self.options.timeout, child.wait_with_output())
            .await
            .map_err(|_| ScriptError::Timeout {
                millis: self.options.timeout.as_millis() as u64,
            })??;

        if !output.status.success() {
            tracing::debug!(status = %output.status, "compiler exited with failure");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        CompileReport::parse(&stdout).map_err(|e| {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.is_empty() {
                e
            } else {
                tracing::warn!(%stderr, "compiler wrote to stderr");
                ScriptError::Parse(format!("{e} (stderr: {stderr})"))
            }
        })
    }

    /// Compile `file` and return its report.
    pub async fn compile(&self, file: &Path) -> Result<CompileReport, ScriptError> {
        self.run(CompileMode::Compile, file).await
    }

    /// Compile `file` and include the native bindings.
    pub async fn inspect(&self, file: &Path) -> Result<CompileReport, ScriptError> {
        self.run(CompileMode::Inspect, file).await
    }
}
