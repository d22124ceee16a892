//! Login trace command - report a login or logout event

use anyhow::Result;
use wlc_lib::{SandboxApi, VerificationApi};

use super::Settings;
use crate::{ui, TraceArgs};

pub async fn run(
    settings: &Settings,
    args: &TraceArgs,
    code: Option<&str>,
    verbose: bool,
) -> Result<()> {
    let client = settings.client()?;
    let batch = super::trace_batch(args)?;

    ui::header(&format!("Login trace ({})", super::mode_label(code)));
    if verbose {
        for event in batch.events() {
            ui::key_value(
                &format!("event {}", event.no),
                &format!("{:?} {:?} at {}", event.subject, event.behavior, event.occurred_at),
            );
        }
    }

    let spinner = ui::spinner("Reporting events...");
    let ctx = super::interruptible();
    let reply = match code {
        Some(code) => ctx.run(client.login_trace_test(code, &batch)).await,
        None => ctx.run(client.login_trace(&batch)).await,
    };
    spinner.finish_and_clear();

    let reply = reply?;
    match (reply.is_success(), reply.failures().count()) {
        (true, 0) => ui::success(&format!("{} event(s) reported", batch.len())),
        (true, failed) => ui::warning(&format!("{} of {} event(s) rejected", failed, batch.len())),
        (false, _) => ui::warning("Batch rejected by the service"),
    }
    ui::trace_reply(&reply);

    Ok(())
}
