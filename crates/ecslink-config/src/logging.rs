//! Logging helpers.
//!
//! Level conversion, log path selection and size-based rotation.
//! The `tracing-subscriber` setup itself lives in the binary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{LogConfig, LogLevel};

/// Rotate once the log grows past this many bytes (10 MB).
pub const DEFAULT_MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Rotated files kept next to the live log.
pub const DEFAULT_MAX_LOG_FILES: u32 = 5;

/// `EnvFilter` directive for a configured level.
pub fn log_level_to_filter(level: LogLevel) -> &'static str {
    level.as_str()
}

/// The log file to write to, if logging to a file was requested.
pub fn log_file_path(config: &LogConfig) -> Option<&Path> {
    config.file.as_deref()
}

/// Create the parent directory of `log_path` if it is missing.
pub fn ensure_log_dir(log_path: &Path) -> io::Result<()> {
    match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn rotated_path(base: &Path, index: u32) -> PathBuf {
    let mut name = base.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{index}"));
    base.with_file_name(name)
}

/// Shift `ecslink.log` to `ecslink.log.1`, `.1` to `.2` and so on once the
/// live file reaches `max_size`; the file at `.max_files` is dropped.
pub fn rotate_log_files(log_path: &Path, max_size: u64, max_files: u32) -> io::Result<()> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if size < max_size || max_files == 0 {
        return Ok(());
    }

    let oldest = rotated_path(log_path, max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for index in (1..max_files).rev() {
        let from = rotated_path(log_path, index);
        if from.exists() {
            fs::rename(&from, rotated_path(log_path, index + 1))?;
        }
    }
    fs::rename(log_path, rotated_path(log_path, 1))
}
