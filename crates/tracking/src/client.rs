//! HTTP client for `GET {base}/api/internal/users/{id}/stats`.

use std::time::Duration;

use async_trait::async_trait;
use engagement_core::criteria::UserStats;
use engagement_core::types::DbId;

use crate::stats::decode_stats;
use crate::StatsSource;

/// Delay before each retry attempt.
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// Errors from the tracking service client.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The tracking service returned a non-2xx status code.
    #[error("Tracking service error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

/// Fetches aggregate workout stats from the tracking service.
pub struct TrackingClient {
    client: reqwest::Client,
    base_url: String,
    max_attempts: u32,
}

impl TrackingClient {
    /// Create a client with a per-request timeout and a total attempt count
    /// (at least one).
    pub fn new(base_url: &str, timeout: Duration, max_attempts: u32) -> Result<Self, TrackingError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_attempts: max_attempts.max(1),
        })
    }

    pub fn stats_url(&self, user_id: DbId) -> String {
        format!("{}/api/internal/users/{user_id}/stats", self.base_url)
    }

    async fn try_fetch(&self, user_id: DbId) -> Result<UserStats, TrackingError> {
        let response = self.client.get(self.stats_url(user_id)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TrackingError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        let body: serde_json::Value = response.json().await?;
        Ok(decode_stats(&body))
    }
}

#[async_trait]
impl StatsSource for TrackingClient {
    async fn fetch_stats(&self, user_id: DbId) -> Result<UserStats, TrackingError> {
        let mut attempt = 1;
        loop {
            match self.try_fetch(user_id).await {
                Ok(stats) => return Ok(stats),
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        attempt,
                        user_id,
                        error = %e,
                        "Tracking stats request failed, retrying"
                    );
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn stats_url_format() {
        let client = TrackingClient::new("http://tracking:8006/", Duration::from_secs(5), 2).unwrap();
        assert_eq!(
            client.stats_url(42),
            "http://tracking:8006/api/internal/users/42/stats"
        );
    }

    #[test]
    fn attempts_at_least_one() {
        let client = TrackingClient::new("http://tracking", Duration::from_secs(5), 0).unwrap();
        assert_eq!(client.max_attempts, 1);
    }

    #[tokio::test]
    async fn unreachable_service_returns_request_error() {
        let client = TrackingClient::new("http://127.0.0.1:9", Duration::from_millis(200), 1).unwrap();
        let result = client.fetch_stats(1).await;
        assert_matches!(result, Err(TrackingError::Request(_)));
    }

    #[test]
    fn api_error_display() {
        let err = TrackingError::ApiError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Tracking service error (500): boom");
    }
}
