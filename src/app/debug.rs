use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::timeout;

use ecslink_bridge::{Debugger, Envelope};

use super::{print_json, App};
use crate::cli::DebugOp;

/// How often `listen` checks that the connection is still up.
const LISTEN_POLL: Duration = Duration::from_secs(1);

fn print_reply(reply: Envelope) -> Result<()> {
    print_json(&reply.body)
}

pub(super) async fn run(app: &App, op: DebugOp) -> Result<()> {
    let mut debugger = Debugger::new(app.bridge());
    let result = execute(&mut debugger, op).await;
    debugger.bridge().close().await;
    result.with_context(|| {
        format!(
            "debug command against {} failed",
            debugger.bridge().options().endpoint
        )
    })
}

async fn execute(debugger: &mut Debugger, op: DebugOp) -> Result<()> {
    match op {
        DebugOp::Enable => print_reply(debugger.enable_breakpoints().await?),
        DebugOp::Break { file, line } => print_json(&debugger.set_breakpoint(&file, line).await?),
        DebugOp::Unbreak { file, line } => {
            if debugger.clear_breakpoint(&file, line).await?.is_none() {
                tracing::debug!(file = %file.display(), line, "breakpoint was not tracked locally");
            }
            Ok(())
        }
        DebugOp::Clear => print_reply(debugger.remove_all_breakpoints().await?),
        DebugOp::Resume => print_reply(debugger.resume().await?),
        DebugOp::Step => print_reply(debugger.step().await?),
        DebugOp::StepIn => print_reply(debugger.step_in().await?),
        DebugOp::StepOut => print_reply(debugger.step_out().await?),
        DebugOp::StepOver => print_reply(debugger.step_over().await?),
        DebugOp::Locals => print_json(&debugger.local_vars().await?),
        DebugOp::Stack { start, end } => print_json(&debugger.stack(start, end).await?),
    }
}

pub(super) async fn listen(app: &App) -> Result<()> {
    let bridge = app.bridge();
    let mut events = bridge.subscribe();
    bridge
        .ensure_connection()
        .await
        .context("cannot listen for events")?;
    tracing::info!(endpoint = %bridge.options().endpoint, "listening for events");

    loop {
        match timeout(LISTEN_POLL, events.recv()).await {
            Ok(Ok(event)) => print_json(&event)?,
            Ok(Err(RecvError::Lagged(skipped))) => {
                tracing::warn!(skipped, "event listener fell behind");
            }
            Ok(Err(RecvError::Closed)) => break,
            Err(_) if !bridge.is_connected() => break,
            Err(_) => {}
        }
    }

    tracing::info!("connection closed");
    Ok(())
}
