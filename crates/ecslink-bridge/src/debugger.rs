//! Script debugger operations on top of the bridge.
//!
//! Each remote operation is a [`Bridge::send_command`] with a fixed name.
//! The raw replies are returned as-is; [`Debugger::stack`] and
//! [`Debugger::local_vars`] shape them for callers that want frames or the
//! variable list directly.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::breakpoint::{Breakpoint, BreakpointManager};
use crate::bridge::Bridge;
use crate::commands;
use crate::error::BridgeError;
use crate::protocol::Envelope;

/// One frame of a shaped call stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    /// Position in the remote call stack (0 = innermost).
    pub index: usize,
    /// Function name reported by the remote.
    pub name: String,
    /// Line reported by the remote, if any.
    pub line: Option<i64>,
}

/// A window of the call stack plus the total depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackTrace {
    /// Frames in `[start, min(end, count))`.
    pub frames: Vec<StackFrame>,
    /// Total number of frames the remote reported.
    pub count: usize,
}

/// Slice a raw `callstack` array into frames `[start, min(end, len))`.
pub fn slice_callstack(callstack: &[Value], start: usize, end: usize) -> StackTrace {
    let end = end.min(callstack.len());
    let frames = (start..end)
        .map(|index| {
            let frame = &callstack[index];
            StackFrame {
                index,
                name: frame
                    .get("function")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                line: frame.get("line").and_then(Value::as_i64),
            }
        })
        .collect();
    StackTrace {
        frames,
        count: callstack.len(),
    }
}

/// Name the remote knows a script file by.
fn remote_file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Debugger facade: named remote operations plus breakpoint bookkeeping.
#[derive(Debug)]
pub struct Debugger {
    bridge: Arc<Bridge>,
    breakpoints: BreakpointManager,
    next_breakpoint_id: i64,
}

impl Debugger {
    /// Create a debugger driving `bridge`.
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self {
            bridge,
            breakpoints: BreakpointManager::new(),
            next_breakpoint_id: 1,
        }
    }

    /// The underlying bridge.
    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.bridge
    }

    /// Breakpoints set through this debugger.
    pub fn breakpoints(&self) -> &BreakpointManager {
        &self.breakpoints
    }

    async fn exec(&self, command: &str, args: Value) -> Result<Envelope, BridgeError> {
        self.bridge.send_command(command, args).await
    }

    pub async fn enable_breakpoints(&self) -> Result<Envelope, BridgeError> {
        self.exec(commands::ENABLE_BREAKPOINTS, json!({})).await
    }

    pub async fn add_breakpoint(&self, file: &str, line: i64) -> Result<Envelope, BridgeError> {
        self.exec(commands::ADD_BREAKPOINT, json!({ "file": file, "line": line }))
            .await
    }

    pub async fn remove_breakpoint(&self, file: &str, line: i64) -> Result<Envelope, BridgeError> {
        self.exec(commands::REMOVE_BREAKPOINT, json!({ "file": file, "line": line }))
            .await
    }

    pub async fn remove_all_breakpoints(&self) -> Result<Envelope, BridgeError> {
        self.exec(commands::REMOVE_ALL_BREAKPOINTS, json!({})).await
    }

    pub async fn resume(&self) -> Result<Envelope, BridgeError> {
        self.exec(commands::RESUME, json!({})).await
    }

    pub async fn step(&self) -> Result<Envelope, BridgeError> {
        self.exec(commands::STEP, json!({})).await
    }

    pub async fn step_in(&self) -> Result<Envelope, BridgeError> {
        self.exec(commands::STEP_IN, json!({})).await
    }

    pub async fn step_out(&self) -> Result<Envelope, BridgeError> {
        self.exec(commands::STEP_OUT, json!({})).await
    }

    pub async fn step_over(&self) -> Result<Envelope, BridgeError> {
        self.exec(commands::STEP_OVER, json!({})).await
    }

    pub async fn get_local_vars(&self) -> Result<Envelope, BridgeError> {
        self.exec(commands::GET_LOCAL_VARS, json!({})).await
    }

    pub async fn get_callstack(&self) -> Result<Envelope, BridgeError> {
        self.exec(commands::GET_CALLSTACK, json!({})).await
    }

    /// Enable breakpoints, add one at `path:line` and track it.
    ///
    /// The breakpoint is recorded before the remote is asked, so a failed
    /// request leaves it tracked but unverified.
    pub async fn set_breakpoint(&mut self, path: &Path, line: i64) -> Result<Breakpoint, BridgeError> {
        let id = self.next_breakpoint_id;
        self.next_breakpoint_id += 1;
        self.breakpoints
            .add(Breakpoint::new(id, path.to_path_buf(), line));

        self.enable_breakpoints().await?;
        let reply = self.add_breakpoint(&remote_file_name(path), line).await?;
        tracing::debug!(id, line, reply = %reply.body, "breakpoint acknowledged");

        self.breakpoints.mark_verified(id);
        self.breakpoints
            .get(id)
            .cloned()
            .ok_or_else(|| BridgeError::InvalidResponse(format!("breakpoint {id} vanished")))
    }

    /// Remove the breakpoint at `path:line` locally and on the remote.
    pub async fn clear_breakpoint(
        &mut self,
        path: &Path,
        line: i64,
    ) -> Result<Option<Breakpoint>, BridgeError> {
        let removed = self.breakpoints.remove(path, line);
        self.remove_breakpoint(&remote_file_name(path), line).await?;
        Ok(removed)
    }

    /// Forget every breakpoint of `path` and clear them on the remote.
    pub async fn clear_breakpoints(&mut self, path: &Path) -> Result<Vec<Breakpoint>, BridgeError> {
        let cleared = self.breakpoints.clear_file(path);
        self.remove_all_breakpoints().await?;
        Ok(cleared)
    }

    /// The `localVars` member of the current frame.
    pub async fn local_vars(&self) -> Result<Value, BridgeError> {
        let reply = self.get_local_vars().await?;
        Ok(reply.require("localVars")?.clone())
    }

    /// Frames `[start, min(end, depth))` of the current call stack.
    pub async fn stack(&self, start: usize, end: usize) -> Result<StackTrace, BridgeError> {
        let reply = self.get_callstack().await?;
        let callstack = reply
            .require("callstack")?
            .as_array()
            .ok_or_else(|| BridgeError::InvalidResponse("`callstack` is not an array".into()))?;
        Ok(slice_callstack(callstack, start, end))
    }
}
