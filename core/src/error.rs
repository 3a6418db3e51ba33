use std::time::Duration;

use serde::Serialize;

/// Everything that can go wrong while configuring or sending a push.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("invalid push URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),
    #[error("push interval must be greater than zero")]
    InvalidInterval,
    #[error("request timeout must be greater than zero")]
    InvalidTimeout,
    #[error("invalid status '{0}' (expected 'up' or 'down')")]
    InvalidStatus(String),
    #[error("push request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The collector answered, but did not accept the heartbeat.
    #[error("push rejected with HTTP {status}{}", reason_suffix(.message))]
    Rejected { status: u16, message: Option<String> },
    #[error("push rate limited by collector")]
    RateLimited { retry_after: Option<Duration> },
}

impl PushError {
    /// Exit codes: 1=rejected (4xx or ok:false), 2=server error (5xx),
    /// 3=connection error, 4=usage error
    pub fn exit_code(&self) -> i32 {
        match self {
            PushError::InvalidUrl { .. }
            | PushError::UnsupportedScheme(_)
            | PushError::InvalidInterval
            | PushError::InvalidTimeout
            | PushError::InvalidStatus(_) => 4,
            PushError::Transport(_) => 3,
            PushError::Rejected { status, .. } if *status >= 500 => 2,
            PushError::Rejected { .. } | PushError::RateLimited { .. } => 1,
        }
    }

    /// Machine-readable error code for CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            PushError::InvalidUrl { .. }
            | PushError::UnsupportedScheme(_)
            | PushError::InvalidInterval
            | PushError::InvalidTimeout
            | PushError::InvalidStatus(_) => codes::USAGE_ERROR,
            PushError::Transport(_) => codes::CONNECTION_ERROR,
            PushError::Rejected { .. } => codes::PUSH_REJECTED,
            PushError::RateLimited { .. } => codes::RATE_LIMITED,
        }
    }

    pub fn docs_hint(&self) -> Option<&'static str> {
        match self {
            PushError::Transport(_) => Some("Is the monitor reachable? Check PUSH_URL."),
            PushError::Rejected { status, .. } if *status == 404 || *status == 401 => {
                Some("Check the push token (PUSH_TOKEN) and that the monitor is active.")
            }
            PushError::InvalidUrl { .. } | PushError::UnsupportedScheme(_) => {
                Some("Set --url or PUSH_URL to the monitor's push URL.")
            }
            _ => None,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            error: self.code().to_string(),
            message: self.to_string(),
            docs_hint: self.docs_hint().map(str::to_string),
        }
    }
}

fn reason_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// Structured error printed by the CLI.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

pub mod codes {
    pub const USAGE_ERROR: &str = "usage_error";
    pub const CONNECTION_ERROR: &str = "connection_error";
    pub const PUSH_REJECTED: &str = "push_rejected";
    pub const RATE_LIMITED: &str = "rate_limited";
}
