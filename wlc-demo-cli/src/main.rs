//! Anti-addiction verification demo CLI
//!
//! Command-line interface for exercising the verification service, both
//! production and the public sandbox.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "wlc-demo")]
#[command(
    about = "Anti-addiction verification demo CLI - real-name checks and login/logout reporting",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    credentials: CredentialArgs,
}

/// Falls back to `WLC_*` environment variables, then to the public sandbox
/// demo credentials.
#[derive(Args, Clone, Debug, Default)]
pub struct CredentialArgs {
    /// Application id
    #[arg(long, global = true)]
    pub app_id: Option<String>,

    /// Shared secret key (hex)
    #[arg(long, global = true)]
    pub secret_key: Option<String>,

    /// Business id
    #[arg(long, global = true)]
    pub biz_id: Option<String>,

    /// Serve every endpoint from this base URL (mock servers, proxies)
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    /// Subject identifier of the verification request
    #[arg(long)]
    pub ai: String,

    /// Real name
    #[arg(long)]
    pub name: String,

    /// National ID number
    #[arg(long)]
    pub id_num: String,
}

#[derive(Args, Clone, Debug)]
pub struct TraceArgs {
    /// Game session id
    #[arg(long)]
    pub session: String,

    /// Device id, reports a guest event
    #[arg(long, conflicts_with = "pi", required_unless_present = "pi")]
    pub device: Option<String>,

    /// Person identifier, reports a verified user event
    #[arg(long)]
    pub pi: Option<String>,

    /// Report a logout instead of a login
    #[arg(long)]
    pub logout: bool,

    /// Event time in unix seconds (defaults to now)
    #[arg(long)]
    pub at: Option<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a real name against a national ID
    Check {
        #[command(flatten)]
        args: CheckArgs,

        /// Sandbox scenario code, runs the call in test mode
        #[arg(long)]
        code: Option<String>,
    },

    /// Query the result of an earlier verification
    Query {
        /// Subject identifier of the verification request
        #[arg(long)]
        ai: String,

        /// Sandbox scenario code, runs the call in test mode
        #[arg(long)]
        code: Option<String>,
    },

    /// Report a login or logout event
    LoginTrace {
        #[command(flatten)]
        args: TraceArgs,

        /// Sandbox scenario code, runs the call in test mode
        #[arg(long)]
        code: Option<String>,
    },

    /// Run the eight sandbox test cases
    Testcases {
        /// Scenario codes for test cases 1-8, comma separated, in order
        #[arg(long = "codes", value_delimiter = ',')]
        codes: Vec<String>,

        /// Run a single test case (1-8)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8))]
        only: Option<u8>,
    },

    /// Print a signed request without sending it
    Sign {
        #[command(subcommand)]
        action: SignAction,
    },
}

#[derive(Subcommand)]
enum SignAction {
    /// Sign a check request
    Check {
        #[command(flatten)]
        args: CheckArgs,

        #[arg(long)]
        code: Option<String>,
    },

    /// Sign a query request
    Query {
        #[arg(long)]
        ai: String,

        #[arg(long)]
        code: Option<String>,
    },

    /// Sign a login trace request
    LoginTrace {
        #[command(flatten)]
        args: TraceArgs,

        #[arg(long)]
        code: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("wlc_demo=debug,wlc_lib=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("wlc_demo=info,wlc_lib=warn")
            .init();
    }

    let settings = commands::Settings::resolve(&cli.credentials);

    // Dispatch commands
    match cli.command {
        Commands::Check { args, code } => {
            commands::check::run(&settings, &args, code.as_deref(), cli.verbose).await?;
        }
        Commands::Query { ai, code } => {
            commands::query::run(&settings, &ai, code.as_deref(), cli.verbose).await?;
        }
        Commands::LoginTrace { args, code } => {
            commands::login_trace::run(&settings, &args, code.as_deref(), cli.verbose).await?;
        }
        Commands::Testcases { codes, only } => {
            commands::testcases::run(&settings, &codes, only, cli.verbose).await?;
        }
        Commands::Sign { action } => match action {
            SignAction::Check { args, code } => {
                commands::sign::check(&settings, &args, code.as_deref())?;
            }
            SignAction::Query { ai, code } => {
                commands::sign::query(&settings, &ai, code.as_deref())?;
            }
            SignAction::LoginTrace { args, code } => {
                commands::sign::login_trace(&settings, &args, code.as_deref())?;
            }
        },
    }

    Ok(())
}
