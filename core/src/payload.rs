use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::PushError;

/// Status reported to the monitor on each push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushStatus {
    #[default]
    Up,
    Down,
}

impl PushStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushStatus::Up => "up",
            PushStatus::Down => "down",
        }
    }
}

impl fmt::Display for PushStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PushStatus {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(PushStatus::Up),
            "down" => Ok(PushStatus::Down),
            _ => Err(PushError::InvalidStatus(s.to_string())),
        }
    }
}

/// How the payload is encoded in a POST body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyFormat {
    /// `application/x-www-form-urlencoded`
    #[default]
    Form,
    /// `application/json`
    Json,
}

impl FromStr for BodyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "form" => Ok(BodyFormat::Form),
            "json" => Ok(BodyFormat::Json),
            other => Err(format!("unknown body format '{other}' (expected form or json)")),
        }
    }
}

/// One heartbeat. Built fresh for every push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPayload {
    pub status: PushStatus,
    pub msg: String,
    /// Response time in milliseconds; sent as an empty value when unknown.
    pub ping: Option<u64>,
}

impl Default for PushPayload {
    fn default() -> Self {
        Self {
            status: PushStatus::Up,
            msg: "OK".to_string(),
            ping: None,
        }
    }
}

impl PushPayload {
    pub fn new(status: PushStatus, msg: impl Into<String>, ping: Option<u64>) -> Self {
        Self {
            status,
            msg: msg.into(),
            ping,
        }
    }

    /// `status`, `msg`, `ping` in wire order. `ping` is always present.
    pub fn form_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("status", self.status.to_string()),
            ("msg", self.msg.clone()),
            ("ping", self.ping.map(|p| p.to_string()).unwrap_or_default()),
        ]
    }

    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        self.form_pairs()
    }

    pub fn json_body(&self) -> serde_json::Value {
        json!({
            "status": self.status,
            "msg": self.msg,
            "ping": self.ping.map_or(json!(""), |p| json!(p)),
        })
    }
}
