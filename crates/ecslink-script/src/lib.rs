//! ecslink-script: script compiler bridge and symbol completion.
//!
//! Runs the external script compiler, reads its JSON report (diagnostics
//! plus native and module symbol tables) and turns symbols into completion
//! items.
pub mod compiler;
pub mod completion;
pub mod error;
pub mod report;

pub use compiler::{CompileMode, Compiler, CompilerOptions, DEFAULT_COMPILE_TIMEOUT_MS};
pub use completion::{global_completions, member_completions, CompletionItem, CompletionItemKind};
pub use error::ScriptError;
pub use report::{
    CompileMessage, CompileReport, DiagnosticSeverity, FunctionInfo, MessageKind, ModuleSymbols,
    ParamInfo, PropertyInfo, TypeInfo,
};
