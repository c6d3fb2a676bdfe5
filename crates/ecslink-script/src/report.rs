//! The JSON report printed by the script compiler.
//!
//! Top-level `funcs` and `types` describe the native bindings (present with
//! `--inspect`); the nested `script` object describes the compiled module.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScriptError;

/// Severity of a compiler message.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Error,
    Warning,
    Info,
}

impl MessageKind {
    /// LSP severity for this kind.
    pub fn severity(self) -> DiagnosticSeverity {
        match self {
            Self::Error => DiagnosticSeverity::Error,
            Self::Warning => DiagnosticSeverity::Warning,
            Self::Info => DiagnosticSeverity::Information,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Error => "ERR ",
            Self::Warning => "WARN",
            Self::Info => "INFO",
        }
    }
}

/// Diagnostic severity, numbered as in the Language Server Protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
}

/// One diagnostic from the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileMessage {
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    /// Script section (file) the message refers to.
    #[serde(default)]
    pub section: String,
    /// 1-based line.
    #[serde(default)]
    pub row: i32,
    /// 1-based column.
    #[serde(default)]
    pub col: i32,
    #[serde(rename = "message", default)]
    pub text: String,
}

impl fmt::Display for CompileMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) : {} : {}",
            self.section,
            self.row,
            self.col,
            self.kind.label(),
            self.text
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamInfo {
    #[serde(rename = "type", default)]
    pub type_name: String,
}

/// A global function or a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    /// Full declaration, e.g. `void update(float dt)`.
    #[serde(default)]
    pub decl: String,
    #[serde(rename = "return", default)]
    pub return_type: String,
    #[serde(default)]
    pub params: Vec<ParamInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
}

/// An object type with its properties and methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: String,
    #[serde(default)]
    pub flags: i64,
    #[serde(default)]
    pub props: Vec<PropertyInfo>,
    #[serde(default)]
    pub methods: Vec<FunctionInfo>,
}

/// Symbols of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSymbols {
    #[serde(default)]
    pub funcs: Vec<FunctionInfo>,
    #[serde(default)]
    pub types: Vec<TypeInfo>,
}

/// Everything the compiler reports for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileReport {
    #[serde(default)]
    pub messages: Vec<CompileMessage>,
    /// Native functions.
    #[serde(default)]
    pub funcs: Vec<FunctionInfo>,
    /// Native types.
    #[serde(default)]
    pub types: Vec<TypeInfo>,
    /// The compiled module, absent when the build could not start.
    #[serde(default)]
    pub script: Option<ModuleSymbols>,
}

impl CompileReport {
    /// Parse the compiler's stdout.
    pub fn parse(stdout: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(stdout.trim()).map_err(|e| ScriptError::Parse(e.to_string()))
    }

    /// Messages of kind error.
    pub fn errors(&self) -> impl Iterator<Item = &CompileMessage> {
        self.messages
            .iter()
            .filter(|m| m.kind == MessageKind::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Look a type up by name, script types first.
    pub fn find_type(&self, name: &str) -> Option<&TypeInfo> {
        self.script
            .iter()
            .flat_map(|m| m.types.iter())
            .chain(self.types.iter())
            .find(|t| t.name == name)
    }
}
