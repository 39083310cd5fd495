//! Error taxonomy for the watch pipeline.
//!
//! Most of these never reach `main`: fetch and render failures are recovered
//! inside the extractors, channel failures inside the dispatcher, and
//! per-target failures at the orchestrator boundary. Only configuration
//! errors abort the process.

use std::time::Duration;
use thiserror::Error;

/// Every failure the pipeline knows how to classify.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Transport-level HTTP failure (connect, TLS, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered, but not with a success status.
    #[error("HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Browser launch, navigation or protocol failure.
    #[error("browser error: {0}")]
    Browser(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid target URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Telegram accepted the request but refused the message.
    #[error("telegram rejected message: {0}")]
    Telegram(String),

    /// Building or sending the email failed.
    #[error("mail error: {0}")]
    Mail(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<lettre::error::Error> for WatchError {
    fn from(err: lettre::error::Error) -> Self {
        WatchError::Mail(err.to_string())
    }
}

impl From<lettre::address::AddressError> for WatchError {
    fn from(err: lettre::address::AddressError) -> Self {
        WatchError::Mail(format!("bad address: {err}"))
    }
}

impl From<lettre::transport::smtp::Error> for WatchError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        WatchError::Mail(err.to_string())
    }
}
