use std::fmt;

use async_trait::async_trait;

use crate::core::message::RawMessageRecord;

/// Errors that end the one-shot load. There is no retry, so variants only
/// exist to produce a useful message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure (DNS, connection refused, reset).
    Network(String),
    /// The endpoint answered with a non-success status.
    Api { status: u16, message: String },
    /// The body was not a JSON array of message records.
    Parse(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
            FetchError::Api { status, message } => {
                write!(f, "failed to fetch messages (HTTP {status}): {message}")
            }
            FetchError::Parse(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Returns a short name for logs.
    fn name(&self) -> &str;

    /// Fetches the raw record sequence, in source order.
    async fn fetch(&self) -> Result<Vec<RawMessageRecord>, FetchError>;
}
