use std::time::Duration;

use pushbeat_core::{PingMode, PushClient, PushConfig, PushStatus, Runner};

use crate::util::{fail, print_json};

#[cfg(unix)]
type Interrupt = tokio::signal::unix::Signal;
#[cfg(windows)]
type Interrupt = tokio::signal::windows::CtrlC;

pub async fn run(
    config: PushConfig,
    interval_secs: u64,
    status: PushStatus,
    msg: String,
    ping_mode: PingMode,
    count: Option<u64>,
    fail_fast: bool,
) -> i32 {
    let client = match config
        .with_interval(Duration::from_secs(interval_secs))
        .and_then(PushClient::new)
    {
        Ok(client) => client,
        Err(err) => return fail(&err),
    };

    let runner = Runner::new(client)
        .with_status(status)
        .with_msg(msg)
        .with_ping_mode(ping_mode)
        .fail_fast(fail_fast)
        .max_pushes(count);

    // Registered before the first push, so Ctrl-C during it is not lost.
    let interrupt = match listen_for_interrupt() {
        Ok(interrupt) => Some(interrupt),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C, running until killed");
            None
        }
    };

    match runner.run(interrupted(interrupt)).await {
        Ok(summary) => {
            print_json(&summary);
            0
        }
        Err(err) => fail(&err),
    }
}

#[cfg(unix)]
fn listen_for_interrupt() -> std::io::Result<Interrupt> {
    use tokio::signal::unix::{SignalKind, signal};

    signal(SignalKind::interrupt())
}

#[cfg(windows)]
fn listen_for_interrupt() -> std::io::Result<Interrupt> {
    tokio::signal::windows::ctrl_c()
}

async fn interrupted(interrupt: Option<Interrupt>) {
    match interrupt {
        Some(mut interrupt) => {
            interrupt.recv().await;
        }
        None => std::future::pending::<()>().await,
    }
}
