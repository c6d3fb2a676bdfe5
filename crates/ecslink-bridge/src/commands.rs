//! Command names understood by the remote process.

/// Turn on breakpoint handling in the script debugger.
pub const ENABLE_BREAKPOINTS: &str = "script::debug::enable";
/// Add a breakpoint (`file`, `line`).
pub const ADD_BREAKPOINT: &str = "script::debug::add_breakpoint";
/// Remove one breakpoint (`file`, `line`).
pub const REMOVE_BREAKPOINT: &str = "script::debug::remove_breakpoint";
/// Remove every breakpoint.
pub const REMOVE_ALL_BREAKPOINTS: &str = "script::debug::remove_all_breakpoints";
/// Continue execution.
pub const RESUME: &str = "script::debug::resume";
/// Single step.
pub const STEP: &str = "script::debug::step";
/// Step into the next call.
pub const STEP_IN: &str = "script::debug::step_into";
/// Step out of the current function.
pub const STEP_OUT: &str = "script::debug::step_out";
/// Step over the next call.
pub const STEP_OVER: &str = "script::debug::step_over";
/// Fetch the local variables of the current frame (`localVars` in the reply).
pub const GET_LOCAL_VARS: &str = "script::debug::get_local_vars";
/// Fetch the call stack (`callstack` in the reply).
pub const GET_CALLSTACK: &str = "script::debug::get_callstack";
/// Fetch templates and systems (`getECSData` in the reply).
pub const GET_ECS_DATA: &str = "getECSData";
