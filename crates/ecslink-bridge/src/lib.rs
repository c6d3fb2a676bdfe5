//! ecslink-bridge: command bridge and script debugger client.
//!
//! This crate talks to a running engine process over a websocket. It
//! correlates command replies by request id, fans unsolicited events out to
//! subscribers, and layers the script debugger operations on top.
pub mod breakpoint;
pub mod bridge;
pub mod commands;
pub mod connection;
pub mod debugger;
pub mod dispatcher;
pub mod error;
pub mod protocol;

// Re-export key types for convenience.
pub use breakpoint::{Breakpoint, BreakpointManager};
pub use bridge::{Bridge, BridgeOptions, DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_MS};
pub use connection::{Connection, PendingReply};
pub use debugger::{slice_callstack, Debugger, StackFrame, StackTrace};
pub use dispatcher::{Dispatcher, Routed};
pub use error::BridgeError;
pub use protocol::{BridgeEvent, Envelope};
