//! HTTP message source backed by `reqwest`.
//!
//! Expects `GET <url>` to answer `200` with a JSON array of records. The relay
//! in front of the real message service reports upstream failures as
//! `500 {"message": "..."}`; that message is surfaced when present.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::core::message::{RawMessageRecord, parse_records};
use crate::source::provider::{FetchError, MessageSource};

/// Error body shape used by the relay endpoint.
#[derive(Deserialize, Debug)]
struct RelayError {
    message: String,
}

pub struct HttpMessageSource {
    url: String,
    client: reqwest::Client,
}

impl HttpMessageSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Picks the most useful text out of an error response body.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(relay) = serde_json::from_str::<RelayError>(body)
        && !relay.message.trim().is_empty()
    {
        return relay.message;
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

#[async_trait]
impl MessageSource for HttpMessageSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self) -> Result<Vec<RawMessageRecord>, FetchError> {
        info!("Fetching messages from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Message source response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Message source error: {} - {}", status, body);
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let records = parse_records(&body).map_err(|e| FetchError::Parse(e.to_string()))?;
        info!("Received {} message records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn relay_message_is_preferred() {
        let body = r#"{"message":"Failed to fetch messages"}"#;
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, body),
            "Failed to fetch messages"
        );
    }

    #[test]
    fn plain_body_is_used_verbatim() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "  upstream down \n"),
            "upstream down"
        );
    }

    #[test]
    fn empty_body_falls_back_to_reason_phrase() {
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "Service Unavailable"
        );
    }

    #[test]
    fn blank_relay_message_falls_back_to_body() {
        let body = r#"{"message":"  "}"#;
        assert_eq!(error_message(StatusCode::INTERNAL_SERVER_ERROR, body), body);
    }
}
