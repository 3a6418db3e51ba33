use std::time::Duration;

use pushbeat_core::{BodyFormat, PushConfig, PushError};
use serde_json::json;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Logs go to stderr so stdout only carries the JSON result.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pushbeat=info,pushbeat_core=info".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

pub fn build_config(
    url: &str,
    token: Option<String>,
    timeout_secs: u64,
    format: BodyFormat,
) -> Result<PushConfig, PushError> {
    Ok(PushConfig::new(url)?
        .with_token(token)
        .with_timeout(Duration::from_secs(timeout_secs))?
        .with_format(format))
}

pub fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{out}"),
        Err(e) => tracing::error!(error = %e, "failed to serialize output"),
    }
}

/// Print a structured error to stderr and return its exit code.
///
/// Exit codes: 1=rejected (4xx), 2=server error (5xx),
///             3=connection error, 4=usage error
pub fn fail(err: &PushError) -> i32 {
    let report = err.report();
    let out = serde_json::to_string_pretty(&report).unwrap_or_else(|_| {
        json!({"error": report.error, "message": report.message}).to_string()
    });
    eprintln!("{out}");
    err.exit_code()
}
