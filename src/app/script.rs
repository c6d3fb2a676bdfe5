use std::path::Path;

use anyhow::{bail, Result};

use ecslink_script::{global_completions, member_completions, CompileReport};

use super::{print_json, App};

pub(super) async fn complete(app: &App, file: &Path, member: Option<&str>) -> Result<()> {
    let report = app.compiler()?.inspect(file).await?;
    let items = match member {
        Some(type_name) => member_completions(&report, type_name),
        None => global_completions(&report),
    };
    tracing::debug!(count = items.len(), "completions built");
    print_json(&items)
}

pub(super) async fn check(app: &App, file: &Path) -> Result<()> {
    let report = app.compiler()?.compile(file).await?;
    for message in &report.messages {
        println!("{message}");
    }
    ensure_clean(&report)
}

fn ensure_clean(report: &CompileReport) -> Result<()> {
    match report.errors().count() {
        0 => Ok(()),
        1 => bail!("1 error"),
        n => bail!("{n} errors"),
    }
}
