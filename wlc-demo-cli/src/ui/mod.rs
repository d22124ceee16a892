//! Terminal UI utilities

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print a section header
pub fn header(text: &str) {
    println!("\n{}", text.bold().underline());
}

/// Print a key-value pair
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

/// Create a spinner progress indicator
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print a separator line
pub fn separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// Print JSON prettily
pub fn json(value: &serde_json::Value) {
    if let Ok(pretty) = serde_json::to_string_pretty(value) {
        println!("{}", pretty);
    }
}

/// Print a check or query reply
pub fn verification(result: &wlc_lib::VerificationResult) {
    use wlc_lib::VerificationStatus;

    key_value("errcode", &result.errcode.to_string());
    key_value("errmsg", &result.errmsg);

    let status = match (&result.status, result.verification_status()) {
        (Some(raw), Some(VerificationStatus::Verified)) => {
            format!("{} ({})", "verified".green(), raw)
        }
        (Some(raw), Some(VerificationStatus::Pending)) => {
            format!("{} ({})", "pending".yellow(), raw)
        }
        (Some(raw), Some(VerificationStatus::Failed)) => format!("{} ({})", "failed".red(), raw),
        (Some(raw), _) => format!("unknown ({})", raw),
        (None, _) => "-".dimmed().to_string(),
    };
    key_value("status", &status);
    key_value("pi", result.pi.as_deref().unwrap_or("-"));
}

/// Print a login trace reply, one line per acknowledgment
pub fn trace_reply(reply: &wlc_lib::TraceBatchResult) {
    key_value("errcode", &reply.errcode.to_string());
    key_value("errmsg", &reply.errmsg);

    for ack in reply {
        let mark = if ack.is_ok() {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        };
        println!(
            "  {} event {}: errcode={} {}",
            mark, ack.no, ack.errcode, ack.errmsg
        );
    }
}
