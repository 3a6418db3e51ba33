pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod runner;

#[cfg(test)]
mod test_support;

pub use client::{PushClient, PushReceipt};
pub use config::{PushConfig, PushMethod};
pub use error::PushError;
pub use payload::{BodyFormat, PushPayload, PushStatus};
pub use runner::{PingMode, RunSummary, Runner};
