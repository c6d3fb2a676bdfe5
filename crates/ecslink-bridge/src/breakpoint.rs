//! Client-side breakpoint bookkeeping.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A breakpoint the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakpoint {
    /// Client-assigned id, unique for the debugger's lifetime.
    pub id: i64,
    /// Source file path.
    pub path: PathBuf,
    /// Line number as sent to the remote.
    pub line: i64,
    /// Whether the remote acknowledged this breakpoint.
    pub verified: bool,
}

impl Breakpoint {
    /// Create a new unverified breakpoint.
    pub fn new(id: i64, path: PathBuf, line: i64) -> Self {
        Self {
            id,
            path,
            line,
            verified: false,
        }
    }
}

/// Breakpoints across files.
#[derive(Debug, Clone, Default)]
pub struct BreakpointManager {
    breakpoints: HashMap<PathBuf, Vec<Breakpoint>>,
}

impl BreakpointManager {
    /// Create a new empty breakpoint manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a breakpoint. Returns the index in the file's breakpoint list.
    pub fn add(&mut self, bp: Breakpoint) -> usize {
        let list = self.breakpoints.entry(bp.path.clone()).or_default();
        list.push(bp);
        list.len() - 1
    }

    /// Remove the breakpoint at the given path and line, returning it.
    pub fn remove(&mut self, path: &Path, line: i64) -> Option<Breakpoint> {
        let list = self.breakpoints.get_mut(path)?;
        let index = list.iter().position(|bp| bp.line == line)?;
        let bp = list.remove(index);
        if list.is_empty() {
            self.breakpoints.remove(path);
        }
        Some(bp)
    }

    /// Get all breakpoints for a file.
    pub fn get_for_file(&self, path: &Path) -> &[Breakpoint] {
        self.breakpoints.get(path).map_or(&[], |v| v.as_slice())
    }

    /// Mark the breakpoint with `id` as acknowledged by the remote.
    ///
    /// Returns `false` if no such breakpoint is tracked.
    pub fn mark_verified(&mut self, id: i64) -> bool {
        match self
            .breakpoints
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|bp| bp.id == id)
        {
            Some(bp) => {
                bp.verified = true;
                true
            }
            None => false,
        }
    }

    /// Find a tracked breakpoint by id.
    pub fn get(&self, id: i64) -> Option<&Breakpoint> {
        self.all().find(|bp| bp.id == id)
    }

    /// Remove all breakpoints for a specific file.
    pub fn clear_file(&mut self, path: &Path) -> Vec<Breakpoint> {
        self.breakpoints.remove(path).unwrap_or_default()
    }

    /// Return an iterator over all breakpoints across all files.
    pub fn all(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values().flat_map(|v| v.iter())
    }
}
