//! Check command - verify a real name against a national ID

use anyhow::Result;
use wlc_lib::{CheckParam, SandboxApi, VerificationApi};

use super::Settings;
use crate::{ui, CheckArgs};

pub async fn run(
    settings: &Settings,
    args: &CheckArgs,
    code: Option<&str>,
    verbose: bool,
) -> Result<()> {
    let client = settings.client()?;
    let param = CheckParam::new(&args.ai, &args.name, &args.id_num);

    ui::header(&format!("Real-name check ({})", super::mode_label(code)));
    if verbose {
        ui::key_value("ai", &param.ai);
        ui::key_value("endpoint", &endpoint(&client, code));
    }

    let spinner = ui::spinner("Submitting check...");
    let ctx = super::interruptible();
    let result = match code {
        Some(code) => ctx.run(client.check_test(code, &param)).await,
        None => ctx.run(client.check(&param)).await,
    };
    spinner.finish_and_clear();

    let result = result?;
    if result.is_success() {
        ui::success("Check accepted");
    } else {
        ui::warning("Check rejected by the service");
    }
    ui::verification(&result);

    Ok(())
}

fn endpoint(client: &wlc_lib::WlcClient, code: Option<&str>) -> String {
    match code {
        Some(_) => client.sandbox_endpoints().check.clone(),
        None => client.endpoints().check.clone(),
    }
}
