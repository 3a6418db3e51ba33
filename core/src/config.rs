use std::time::Duration;

use url::Url;

use crate::error::PushError;
use crate::payload::BodyFormat;

pub const PUSH_TOKEN_HEADER: &str = "X-Push-Token";
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 28;

/// How a push is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMethod {
    /// Token in the `X-Push-Token` header, payload in the body.
    Post,
    /// Token embedded in the URL path, payload in the query string.
    Get,
}

#[derive(Debug, Clone)]
pub struct PushConfig {
    url: Url,
    token: Option<String>,
    interval: Duration,
    timeout: Duration,
    format: BodyFormat,
}

impl PushConfig {
    pub fn new(url: &str) -> Result<Self, PushError> {
        let parsed = Url::parse(url.trim()).map_err(|source| PushError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PushError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        Ok(Self {
            url: parsed,
            token: None,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            format: BodyFormat::default(),
        })
    }

    /// Blank tokens count as no token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Result<Self, PushError> {
        if interval.is_zero() {
            return Err(PushError::InvalidInterval);
        }
        self.interval = interval;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, PushError> {
        if timeout.is_zero() {
            return Err(PushError::InvalidTimeout);
        }
        self.timeout = timeout;
        Ok(self)
    }

    pub fn with_format(mut self, format: BodyFormat) -> Self {
        self.format = format;
        self
    }

    pub fn method(&self) -> PushMethod {
        if self.token.is_some() {
            PushMethod::Post
        } else {
            PushMethod::Get
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn format(&self) -> BodyFormat {
        self.format
    }
}
