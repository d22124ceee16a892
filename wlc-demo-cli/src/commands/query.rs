//! Query command - look up an earlier verification

use anyhow::Result;
use wlc_lib::{SandboxApi, VerificationApi};

use super::Settings;
use crate::ui;

pub async fn run(settings: &Settings, ai: &str, code: Option<&str>, verbose: bool) -> Result<()> {
    let client = settings.client()?;

    ui::header(&format!("Verification query ({})", super::mode_label(code)));
    if verbose {
        ui::key_value("ai", ai);
    }

    let spinner = ui::spinner("Querying...");
    let ctx = super::interruptible();
    let result = match code {
        Some(code) => ctx.run(client.query_test(code, ai)).await,
        None => ctx.run(client.query(ai)).await,
    };
    spinner.finish_and_clear();

    let result = result?;
    if result.is_success() {
        ui::success("Query answered");
    } else {
        ui::warning("Query rejected by the service");
    }
    ui::verification(&result);

    Ok(())
}
