//! Completion items built from a compile report.

use serde::{Deserialize, Serialize};

use crate::report::{CompileReport, FunctionInfo, TypeInfo};

/// Completion item kind, numbered as in the Language Server Protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionItemKind {
    Method = 2,
    Function = 3,
    Class = 7,
    Property = 10,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionItemKind,
    /// Declaration or type shown next to the label.
    pub detail: Option<String>,
}

impl CompletionItem {
    fn function(f: &FunctionInfo) -> Self {
        Self {
            label: f.name.clone(),
            kind: CompletionItemKind::Function,
            detail: Some(f.decl.clone()),
        }
    }

    fn class(t: &TypeInfo) -> Self {
        Self {
            label: t.name.clone(),
            kind: CompletionItemKind::Class,
            detail: None,
        }
    }
}

fn push_members(items: &mut Vec<CompletionItem>, t: &TypeInfo) {
    items.extend(t.props.iter().map(|p| CompletionItem {
        label: p.name.clone(),
        kind: CompletionItemKind::Property,
        detail: Some(p.type_name.clone()),
    }));
    items.extend(t.methods.iter().map(|m| CompletionItem {
        label: m.name.clone(),
        kind: CompletionItemKind::Method,
        detail: Some(m.decl.clone()),
    }));
}

/// Globally visible names: native functions and types, then the module's
/// own functions and types.
pub fn global_completions(report: &CompileReport) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = report.funcs.iter().map(CompletionItem::function).collect();
    items.extend(report.types.iter().map(CompletionItem::class));
    if let Some(script) = &report.script {
        items.extend(script.funcs.iter().map(CompletionItem::function));
        items.extend(script.types.iter().map(CompletionItem::class));
    }
    items
}

/// Members of `type_name`: properties then methods. Script types are
/// listed before native types of the same name.
pub fn member_completions(report: &CompileReport, type_name: &str) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    let script_types = report.script.iter().flat_map(|m| m.types.iter());
    for t in script_types.chain(report.types.iter()) {
        if t.name == type_name {
            push_members(&mut items, t);
        }
    }
    items
}
