//! HTTP client for the tracker's form-encoded JSON API

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::event::PollResult;
use crate::target::{strip_fragment, UnreadTarget};

/// Fetch-level failure, classified by what the caller can do about it
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Server answered with a non-200 status
    #[error("server returned status {0}")]
    Status(u16),
    /// Request never completed (connect failure, timeout, bad host)
    #[error("transport error: {0}")]
    Transport(String),
}

/// The three server operations the watcher needs.
///
/// `ApiClient` is the real implementation; tests drive the poll loop and
/// dispatcher through scripted implementations of this trait.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// Incremental history since `tid`
    async fn history(&self, tid: u64) -> Result<PollResult, ApiError>;

    /// Full JSON payload for an item (comments included)
    async fn item_full(&self, url: &str) -> Result<Option<serde_json::Value>, ApiError>;

    /// Flip an item back to unread
    async fn mark_unread(&self, target: &UnreadTarget) -> Result<(), ApiError>;
}

/// Client bound to one tracker host
pub struct ApiClient {
    client: reqwest::Client,
    host: String,
}

impl ApiClient {
    pub fn new(host: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Issue one form-encoded request against `host + path`.
    ///
    /// A 200 with an unparsable or empty body resolves to `Ok(None)` —
    /// malformed payloads are tolerated, not fatal. Any other status is an
    /// error carrying the numeric code. No retries happen here; retry
    /// policy belongs to callers.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<Option<serde_json::Value>, ApiError> {
        let url = format!("{}{}", self.host, path);
        debug!(method = %method, url = %url, "tracker request");

        let mut request = self
            .client
            .request(method, &url)
            .header("Content-Type", "application/x-www-form-urlencoded");
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(ApiError::Status(status));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(serde_json::from_str(&text).ok())
    }
}

#[async_trait]
impl TrackerApi for ApiClient {
    async fn history(&self, tid: u64) -> Result<PollResult, ApiError> {
        let body = format!("tid={}", tid);
        let json = self
            .request(Method::POST, "/server/history", Some(body))
            .await?;

        // An empty or undecodable 200 body counts as "nothing changed"
        Ok(json
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_else(|| PollResult::empty(tid)))
    }

    async fn item_full(&self, url: &str) -> Result<Option<serde_json::Value>, ApiError> {
        let path = format!("{}?json=full", strip_fragment(url));
        self.request(Method::GET, &path, None).await
    }

    async fn mark_unread(&self, target: &UnreadTarget) -> Result<(), ApiError> {
        match target {
            UnreadTarget::ServiceDesk { path } => {
                self.request(Method::POST, path, None).await?;
            }
            UnreadTarget::Task { id } => {
                let body = format!("json=&make_unread=&id={}", id);
                self.request(Method::POST, "/tasks/operations/index", Some(body))
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = ApiClient::new("https://tw.example.com/").unwrap();
        assert_eq!(client.host(), "https://tw.example.com");
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(ApiError::Status(403).to_string(), "server returned status 403");
        assert!(ApiError::Transport("timed out".to_string())
            .to_string()
            .contains("timed out"));
    }
}
