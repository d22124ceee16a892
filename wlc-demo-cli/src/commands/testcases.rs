//! Testcases command - the eight sandbox acceptance scenarios
//!
//! Each scenario needs its own code from the operator console
//! (data sharing -> interface testing). A missing code is sent as empty.

use std::future::Future;

use anyhow::Result;
use wlc_lib::{CallContext, CheckParam, LoginTraceParam, SandboxApi, WlcClient, WlcError};

use super::Settings;
use crate::ui;

const SESSION: &str = "12345678901234567890123456789012";
const DEVICE: &str = "12345678901234567890123456789012";
const PI: &str = "1fffbjzos82bs9cnyj1dna7d6d29zg4esnh99u";

enum Scenario {
    Check {
        ai: &'static str,
        name: &'static str,
        id_num: &'static str,
    },
    Query {
        ai: &'static str,
    },
    GuestLogin,
    UserLogin,
}

static CASES: [(&str, Scenario); 8] = [
    (
        "check - verified",
        Scenario::Check {
            ai: "100000000000000001",
            name: "某一一",
            id_num: "110000190101010001",
        },
    ),
    (
        "check - pending",
        Scenario::Check {
            ai: "200000000000000002",
            name: "某二二",
            id_num: "110000190201020004",
        },
    ),
    (
        "check - failed",
        Scenario::Check {
            ai: "3200000000000000002",
            name: "某二二",
            id_num: "110000190201020004",
        },
    ),
    (
        "query - verified",
        Scenario::Query {
            ai: "100000000000000001",
        },
    ),
    (
        "query - pending",
        Scenario::Query {
            ai: "200000000000000001",
        },
    ),
    (
        "query - failed",
        Scenario::Query {
            ai: "300000000000000001",
        },
    ),
    ("login trace - guest", Scenario::GuestLogin),
    ("login trace - verified user", Scenario::UserLogin),
];

pub async fn run(
    settings: &Settings,
    codes: &[String],
    only: Option<u8>,
    verbose: bool,
) -> Result<()> {
    let client = settings.client()?;

    if codes.len() < CASES.len() && only.is_none() {
        ui::warning(&format!(
            "{} scenario code(s) given, the remaining cases run with an empty code",
            codes.len()
        ));
    }

    let selected: Vec<usize> = match only {
        Some(n) => vec![usize::from(n)],
        None => (1..=CASES.len()).collect(),
    };

    // One Ctrl-C listener for the whole run.
    let ctx = super::interruptible();
    let (client, ctx) = (&client, &ctx);

    let tally = drive(selected, move |number| {
        let (title, scenario) = &CASES[number - 1];
        let code = codes.get(number - 1).map(String::as_str).unwrap_or_default();
        ui::header(&format!("testcase{:02} {}", number, title));
        if verbose {
            ui::key_value("code", code);
        }
        run_case(client, ctx, scenario, code)
    })
    .await;

    ui::separator();
    if tally.interrupted {
        ui::warning(&format!(
            "Interrupted after {} completed test case(s)",
            tally.completed
        ));
    } else if tally.failed == 0 {
        ui::success("All test cases completed");
    } else {
        ui::warning(&format!("{} test case(s) failed to complete", tally.failed));
    }

    Ok(())
}

/// Counts from one run over the selected cases.
#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    completed: usize,
    failed: usize,
    interrupted: bool,
}

/// Run cases in order. A failed case is reported and the run continues;
/// cancellation stops the run.
async fn drive<F, Fut>(numbers: impl IntoIterator<Item = usize>, mut case: F) -> Tally
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = wlc_lib::Result<()>>,
{
    let mut tally = Tally::default();
    for number in numbers {
        match case(number).await {
            Ok(()) => tally.completed += 1,
            Err(WlcError::Cancelled) => {
                tally.interrupted = true;
                break;
            }
            Err(e) => {
                ui::error(&format!("testcase{:02} failed: {}", number, e));
                tally.failed += 1;
            }
        }
    }
    tally
}

async fn run_case(
    client: &WlcClient,
    ctx: &CallContext,
    scenario: &Scenario,
    code: &str,
) -> wlc_lib::Result<()> {
    match scenario {
        Scenario::Check { ai, name, id_num } => {
            let param = CheckParam::new(*ai, *name, *id_num);
            let result = ctx.run(client.check_test(code, &param)).await?;
            ui::verification(&result);
        }
        Scenario::Query { ai } => {
            let result = ctx.run(client.query_test(code, ai)).await?;
            ui::verification(&result);
        }
        Scenario::GuestLogin | Scenario::UserLogin => {
            let now = chrono::Utc::now().timestamp();
            let mut batch = LoginTraceParam::new();
            if matches!(scenario, Scenario::GuestLogin) {
                batch.add_guest_login(SESSION, now, DEVICE);
            } else {
                batch.add_user_login(SESSION, now, PI);
            }
            let reply = ctx.run(client.login_trace_test(code, &batch)).await?;
            ui::trace_reply(&reply);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_case_does_not_stop_the_run() {
        let tally = drive(1..=3, |n| async move {
            if n == 2 {
                Err(WlcError::Decode("eof".into()))
            } else {
                Ok(())
            }
        })
        .await;

        assert_eq!(
            tally,
            Tally {
                completed: 2,
                failed: 1,
                interrupted: false
            }
        );
    }

    #[tokio::test]
    async fn test_cancelled_case_stops_the_run() {
        let mut started = Vec::new();
        let tally = drive(1..=8, |n| {
            started.push(n);
            async move {
                match n {
                    3 => Err(WlcError::Cancelled),
                    _ => Ok(()),
                }
            }
        })
        .await;

        assert_eq!(started, vec![1, 2, 3]);
        assert_eq!(
            tally,
            Tally {
                completed: 2,
                failed: 0,
                interrupted: true
            }
        );
    }

    #[test]
    fn test_every_case_has_a_title() {
        assert_eq!(CASES.len(), 8);
        assert!(CASES.iter().all(|(title, _)| !title.is_empty()));
    }
}
