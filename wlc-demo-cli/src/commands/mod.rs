//! CLI command implementations

pub mod check;
pub mod login_trace;
pub mod query;
pub mod sign;
pub mod testcases;

use anyhow::{Context, Result};
use wlc_lib::{CallContext, Credentials, LoginTraceParam, WlcClient, WlcConfig};

use crate::{CredentialArgs, TraceArgs};

/// Public sandbox demo application id.
pub const DEMO_APP_ID: &str = "a0298befcc6340dcac218d5016669df3";
/// Public sandbox demo secret key.
pub const DEMO_SECRET_KEY: &str = "bbd3322487be9f3b2af1e7d1d3734f41";
/// Public sandbox demo business id.
pub const DEMO_BIZ_ID: &str = "1101999999";

/// Client settings after applying flags, environment and demo defaults.
#[derive(Debug)]
pub struct Settings {
    pub credentials: Credentials,
    pub base_url: Option<String>,
    /// True when any credential came from the demo defaults.
    pub demo_credentials: bool,
}

impl Settings {
    pub fn resolve(args: &CredentialArgs) -> Self {
        let mut demo_credentials = false;
        let mut pick = |flag: &Option<String>, var: &str, demo: &str| {
            flag.clone()
                .or_else(|| std::env::var(var).ok())
                .unwrap_or_else(|| {
                    demo_credentials = true;
                    demo.to_string()
                })
        };

        let app_id = pick(&args.app_id, "WLC_APP_ID", DEMO_APP_ID);
        let secret_key = pick(&args.secret_key, "WLC_SECRET_KEY", DEMO_SECRET_KEY);
        let biz_id = pick(&args.biz_id, "WLC_BIZ_ID", DEMO_BIZ_ID);

        let base_url = args
            .base_url
            .clone()
            .or_else(|| std::env::var("WLC_BASE_URL").ok());

        Self {
            credentials: Credentials::new(app_id, secret_key, biz_id),
            base_url,
            demo_credentials,
        }
    }

    pub fn config(&self) -> WlcConfig {
        let config = WlcConfig::from_credentials(self.credentials.clone());
        match &self.base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }

    pub fn client(&self) -> Result<WlcClient> {
        if self.demo_credentials {
            tracing::info!("using public sandbox demo credentials");
        }
        WlcClient::new(self.config()).context("Failed to create verification client")
    }
}

/// A call context cancelled by Ctrl-C.
pub fn interruptible() -> CallContext {
    let (ctx, handle) = CallContext::background().cancellable();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });
    ctx
}

/// Build a one-event batch from trace arguments.
pub fn trace_batch(args: &TraceArgs) -> Result<LoginTraceParam> {
    let at = args.at.unwrap_or_else(|| chrono::Utc::now().timestamp());
    let mut batch = LoginTraceParam::new();

    match (&args.device, &args.pi, args.logout) {
        (Some(device), None, false) => batch.add_guest_login(&args.session, at, device),
        (Some(device), None, true) => batch.add_guest_logout(&args.session, at, device),
        (None, Some(pi), false) => batch.add_user_login(&args.session, at, pi),
        (None, Some(pi), true) => batch.add_user_logout(&args.session, at, pi),
        _ => anyhow::bail!("Specify exactly one of --device (guest) or --pi (verified user)"),
    };

    Ok(batch)
}

/// Label shown next to an operation.
pub fn mode_label(code: Option<&str>) -> String {
    match code {
        Some(code) => format!("sandbox, code {}", code),
        None => "production".to_string(),
    }
}
