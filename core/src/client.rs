use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::{Deserialize, Serialize};

use crate::config::{PUSH_TOKEN_HEADER, PushConfig, PushMethod};
use crate::error::PushError;
use crate::payload::{BodyFormat, PushPayload};

/// Reply body of the push endpoint. Both fields are optional so that
/// collectors answering with plain text still count as accepted on 2xx.
#[derive(Debug, Default, Deserialize)]
struct PushReply {
    ok: Option<bool>,
    msg: Option<String>,
}

/// An accepted push.
#[derive(Debug, Clone, Serialize)]
pub struct PushReceipt {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    /// Round-trip time until the response headers arrived.
    pub elapsed_ms: u64,
    pub pushed_at: DateTime<Utc>,
}

pub struct PushClient {
    http: reqwest::Client,
    config: PushConfig,
}

impl PushClient {
    pub fn new(config: PushConfig) -> Result<Self, PushError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("pushbeat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    pub fn build_request(&self, payload: &PushPayload) -> Result<reqwest::Request, PushError> {
        let url = self.config.url().clone();
        let builder = match self.config.method() {
            PushMethod::Post => {
                let mut req = self.http.post(url);
                if let Some(token) = self.config.token() {
                    req = req.header(PUSH_TOKEN_HEADER, token);
                }
                match self.config.format() {
                    BodyFormat::Form => req.form(payload.form_pairs().as_slice()),
                    BodyFormat::Json => req.json(&payload.json_body()),
                }
            }
            PushMethod::Get => self.http.get(url).query(payload.query_pairs().as_slice()),
        };
        Ok(builder.build()?)
    }

    pub async fn push(&self, payload: &PushPayload) -> Result<PushReceipt, PushError> {
        let request = self.build_request(payload)?;
        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            status = %payload.status,
            "sending push"
        );

        let pushed_at = Utc::now();
        let started = Instant::now();
        let response = self.http.execute(request).await?;
        let elapsed = started.elapsed();

        let status = response.status();
        let retry_after = retry_after(response.headers());
        let text = response.text().await.unwrap_or_default();
        let reply: PushReply = serde_json::from_str(&text).unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PushError::RateLimited { retry_after });
        }
        if !status.is_success() || reply.ok == Some(false) {
            return Err(PushError::Rejected {
                status: status.as_u16(),
                message: reply.msg,
            });
        }

        Ok(PushReceipt {
            status: status.as_u16(),
            ok: reply.ok,
            msg: reply.msg,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            pushed_at,
        })
    }
}

/// `Retry-After` in its delay-seconds form; HTTP dates are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
