//! Script tooling error types.

use thiserror::Error;

/// Errors from running the script compiler or reading its report.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The compiler process could not be started.
    #[error("compiler failed to start: {0}")]
    SpawnFailed(String),

    /// The compiler did not finish in time.
    #[error("compiler timed out after {millis} ms")]
    Timeout {
        /// The ceiling that elapsed.
        millis: u64,
    },

    /// The compiler printed something other than a JSON report.
    #[error("invalid compiler report: {0}")]
    Parse(String),

    /// I/O error while talking to the compiler.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_spawn_failed_display() {
        let err = ScriptError::SpawnFailed("sample.exe: not found".into());
        assert_eq!(err.to_string(), "compiler failed to start: sample.exe: not found");
    }

    #[test]
    fn error_timeout_display() {
        let err = ScriptError::Timeout { millis: 1500 };
        assert_eq!(err.to_string(), "compiler timed out after 1500 ms");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: ScriptError = io_err.into();
        assert!(matches!(err, ScriptError::Io(_)));
        assert!(err.to_string().contains("pipe closed"));
    }
}
