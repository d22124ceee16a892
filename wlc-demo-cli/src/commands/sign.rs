//! Sign command - build a signed request offline and print it

use anyhow::Result;
use serde::Serialize;
use wlc_lib::{signing, CheckParam, PreparedRequest, QueryParams};

use super::Settings;
use crate::{ui, CheckArgs, TraceArgs};

/// Printable form of a prepared request.
#[derive(Serialize)]
struct SignedRequestView<'a> {
    operation: &'static str,
    method: &'a str,
    url: &'a str,
    query: &'a QueryParams,
    headers: Vec<(&'static str, String)>,
    body: &'a str,
    /// Plaintext payload recovered from the envelope.
    payload: Option<serde_json::Value>,
}

pub fn check(settings: &Settings, args: &CheckArgs, code: Option<&str>) -> Result<()> {
    let client = settings.client()?;
    let param = CheckParam::new(&args.ai, &args.name, &args.id_num);
    let prepared = client.prepare_check(code, &param)?;
    print(settings, &client, &prepared)
}

pub fn query(settings: &Settings, ai: &str, code: Option<&str>) -> Result<()> {
    let client = settings.client()?;
    let prepared = client.prepare_query(code, ai)?;
    print(settings, &client, &prepared)
}

pub fn login_trace(settings: &Settings, args: &TraceArgs, code: Option<&str>) -> Result<()> {
    let client = settings.client()?;
    let batch = super::trace_batch(args)?;
    let prepared = client.prepare_login_trace(code, &batch)?;
    print(settings, &client, &prepared)
}

fn print(
    settings: &Settings,
    client: &wlc_lib::WlcClient,
    prepared: &PreparedRequest,
) -> Result<()> {
    let payload = match prepared.envelope()? {
        Some(envelope) => Some(envelope.open(client.cipher())?),
        None => None,
    };

    let view = SignedRequestView {
        operation: prepared.operation.as_str(),
        method: prepared.method.as_str(),
        url: &prepared.url,
        query: &prepared.params,
        headers: prepared.headers(),
        body: &prepared.body,
        payload,
    };

    ui::header(&format!("Signed {} request", prepared.operation));
    ui::json(&serde_json::to_value(&view)?);

    // Recompute the way the service does before reporting success.
    if signing::verify(
        &settings.credentials.secret_key,
        &prepared.params,
        &prepared.body,
        &prepared.signature,
    ) {
        ui::success("Signature verified");
    } else {
        ui::error("Signature mismatch");
        anyhow::bail!("Signature verification failed");
    }

    if settings.demo_credentials {
        ui::info("Signed with the public sandbox demo credentials");
    }

    Ok(())
}
