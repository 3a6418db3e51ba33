use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::PushClient;
use crate::error::PushError;
use crate::payload::{PushPayload, PushStatus};

/// Source of the `ping` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PingMode {
    #[default]
    Empty,
    Fixed(u64),
    /// Round-trip time of the previous accepted push, in milliseconds.
    Measured,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub attempts: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    fn start() -> Self {
        Self {
            attempts: 0,
            succeeded: 0,
            failed: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }
}

/// A rate-limited push waits for the collector's `Retry-After` when that is
/// longer than the interval; every other failure keeps the interval.
fn wait_after_failure(interval: Duration, err: &PushError) -> Duration {
    match err {
        PushError::RateLimited {
            retry_after: Some(retry_after),
        } => interval.max(*retry_after),
        _ => interval,
    }
}

/// The heartbeat loop: push, sleep, repeat.
pub struct Runner {
    client: PushClient,
    status: PushStatus,
    msg: String,
    ping_mode: PingMode,
    fail_fast: bool,
    max_pushes: Option<u64>,
}

impl Runner {
    pub fn new(client: PushClient) -> Self {
        let defaults = PushPayload::default();
        Self {
            client,
            status: defaults.status,
            msg: defaults.msg,
            ping_mode: PingMode::default(),
            fail_fast: false,
            max_pushes: None,
        }
    }

    pub fn with_status(mut self, status: PushStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = msg.into();
        self
    }

    pub fn with_ping_mode(mut self, ping_mode: PingMode) -> Self {
        self.ping_mode = ping_mode;
        self
    }

    /// Stop at the first failed push instead of logging it and carrying on.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn max_pushes(mut self, max_pushes: Option<u64>) -> Self {
        self.max_pushes = max_pushes;
        self
    }

    fn limit_reached(&self, attempts: u64) -> bool {
        self.max_pushes.is_some_and(|max| attempts >= max)
    }

    fn next_payload(&self, last_elapsed_ms: Option<u64>) -> PushPayload {
        let ping = match self.ping_mode {
            PingMode::Empty => None,
            PingMode::Fixed(ms) => Some(ms),
            PingMode::Measured => last_elapsed_ms,
        };
        PushPayload::new(self.status, self.msg.clone(), ping)
    }

    /// Runs until `max_pushes` is reached, `shutdown` resolves, or (with
    /// `fail_fast`) a push fails. The first push is sent immediately and
    /// shutdown is only observed between pushes.
    pub async fn run<F>(&self, shutdown: F) -> Result<RunSummary, PushError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let interval = self.client.config().interval();
        let mut summary = RunSummary::start();
        let mut last_elapsed_ms = None;

        tracing::info!(
            url = %self.client.config().url(),
            method = ?self.client.config().method(),
            interval_secs = interval.as_secs_f64(),
            "push loop started"
        );

        while !self.limit_reached(summary.attempts) {
            let payload = self.next_payload(last_elapsed_ms);
            summary.attempts += 1;
            let mut wait = interval;

            match self.client.push(&payload).await {
                Ok(receipt) => {
                    summary.succeeded += 1;
                    last_elapsed_ms = Some(receipt.elapsed_ms);
                    tracing::info!(
                        attempt = summary.attempts,
                        http_status = receipt.status,
                        elapsed_ms = receipt.elapsed_ms,
                        "pushed"
                    );
                }
                Err(err) => {
                    summary.failed += 1;
                    tracing::warn!(attempt = summary.attempts, error = %err, "push failed");
                    if self.fail_fast {
                        return Err(err);
                    }
                    wait = wait_after_failure(interval, &err);
                }
            }

            if self.limit_reached(summary.attempts) {
                break;
            }

            tracing::debug!(wait_secs = wait.as_secs_f64(), "sleeping until next push");
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, stopping push loop");
                    break;
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }

        summary.finished_at = Some(Utc::now());
        tracing::info!(
            attempts = summary.attempts,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "push loop finished"
        );
        Ok(summary)
    }
}
