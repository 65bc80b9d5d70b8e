//! Request/response operations against the workout server
//!
//! Thin HTTP client over the server's JSON API. Every call is independently
//! fallible and never retried here; transient failures are surfaced once to
//! the caller.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    CurrentWorkout, NavigateDirection, NavigateRequest, ServerState, SetGroupRequest, WorkoutGroup,
};

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure kinds for gateway operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server could not be contacted
    #[error("server unreachable: {0}")]
    Unreachable(String),
    /// The server answered with something unusable
    #[error("invalid server response: {0}")]
    Invalid(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_status() {
            ApiError::Invalid(err.to_string())
        } else {
            ApiError::Unreachable(err.to_string())
        }
    }
}

/// Command surface the playback engine navigates through
///
/// `ApiClient` is the real implementation; tests script their own.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch the full cursor state (bootstrap only)
    async fn state(&self) -> Result<ServerState, ApiError>;

    /// Move the cursor. `None` means the cursor did not move (boundary).
    async fn navigate(
        &self,
        direction: NavigateDirection,
    ) -> Result<Option<CurrentWorkout>, ApiError>;

    /// Select a workout group; returns per-workout availability
    async fn select_group(&self, group_id: i64) -> Result<HashMap<String, bool>, ApiError>;

    /// Fetch the group catalog
    async fn groups(&self) -> Result<Vec<WorkoutGroup>, ApiError>;

    /// Resolve a server-relative video path into a playable URI
    fn media_url(&self, video_url: &str) -> String;
}

/// HTTP implementation of [`Gateway`]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the given server base URL
    pub fn new(server_url: &str) -> Self {
        let mut base_url = server_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// The normalized base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Gateway for ApiClient {
    async fn state(&self) -> Result<ServerState, ApiError> {
        let response = self
            .http
            .get(self.url("api/state"))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn navigate(
        &self,
        direction: NavigateDirection,
    ) -> Result<Option<CurrentWorkout>, ApiError> {
        debug!(?direction, "requesting cursor move");

        let response = self
            .http
            .post(self.url("api/state/navigate"))
            .timeout(REQUEST_TIMEOUT)
            .json(&NavigateRequest { direction })
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn select_group(&self, group_id: i64) -> Result<HashMap<String, bool>, ApiError> {
        let response = self
            .http
            .post(self.url("api/state/set-group"))
            .timeout(REQUEST_TIMEOUT)
            .json(&SetGroupRequest { group_id })
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn groups(&self) -> Result<Vec<WorkoutGroup>, ApiError> {
        let response = self
            .http
            .get(self.url("api/groups"))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    fn media_url(&self, video_url: &str) -> String {
        format!("{}{}", self.base_url, video_url.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new("http://gym-pi:8080");
        assert_eq!(client.base_url(), "http://gym-pi:8080/");

        let client = ApiClient::new("http://gym-pi:8080/");
        assert_eq!(client.base_url(), "http://gym-pi:8080/");
    }

    #[test]
    fn test_endpoint_urls() {
        let client = ApiClient::new("http://gym-pi:8080");
        assert_eq!(client.url("api/state"), "http://gym-pi:8080/api/state");
        assert_eq!(
            client.url("api/state/navigate"),
            "http://gym-pi:8080/api/state/navigate"
        );
    }

    #[test]
    fn test_media_url_resolution() {
        let client = ApiClient::new("http://gym-pi:8080/");
        assert_eq!(
            client.media_url("/videos/7.mp4"),
            "http://gym-pi:8080/videos/7.mp4"
        );
        // Already-relative paths resolve the same way
        assert_eq!(
            client.media_url("videos/7.mp4"),
            "http://gym-pi:8080/videos/7.mp4"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_maps_to_unreachable() {
        // Nothing listens on this port
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client.state().await.unwrap_err();
        assert!(matches!(err, ApiError::Unreachable(_)));
    }
}
