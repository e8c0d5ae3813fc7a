//! OTX feed client
//!
//! Fetches subscribed pulses from AlienVault OTX.

use serde::Deserialize;

use crate::models::PulsePage;

const API_KEY_HEADER: &str = "X-OTX-API-KEY";
const SUBSCRIBED_PATH: &str = "/api/v1/pulses/subscribed";

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("API key is missing!")]
    MissingApiKey,
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("Failed to fetch data: {0}")]
    Network(String),
    #[error("Failed to parse feed response: {0}")]
    Parse(String),
}

/// Error body shapes OTX uses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
    detail: Option<String>,
}

#[derive(Clone)]
pub struct FeedClient {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl FeedClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http_client,
        }
    }

    /// Fetch one page of subscribed pulses.
    ///
    /// Fails with [`FeedError::MissingApiKey`] before any network call when no
    /// key is configured.
    pub async fn fetch_subscribed(&self, page: u32) -> Result<PulsePage, FeedError> {
        let api_key = self.api_key.as_deref().ok_or(FeedError::MissingApiKey)?;
        let url = format!("{}{}", self.base_url, SUBSCRIBED_PATH);

        let response = self.http_client
            .get(&url)
            .query(&[("page", page)])
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("Failed to fetch data").to_string();
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error.or(body.detail))
                .unwrap_or(fallback);

            tracing::warn!("OTX returned {}: {}", status.as_u16(), message);
            return Err(FeedError::Upstream { status: status.as_u16(), message });
        }

        response.json::<PulsePage>()
            .await
            .map_err(|e| FeedError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str, api_key: Option<&str>) -> FeedClient {
        FeedClient::new(base_url, api_key.map(str::to_string), reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server.uri(), None).fetch_subscribed(1).await.unwrap_err();
        assert!(matches!(err, FeedError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_fetch_sends_key_and_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SUBSCRIBED_PATH))
            .and(query_param("page", "3"))
            .and(header(API_KEY_HEADER, "otx-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 1,
                "next": null,
                "results": [{
                    "id": "65a1",
                    "name": "Volt Typhoon",
                    "description": "Living off the land",
                    "tags": ["volt-typhoon"],
                    "modified": "2024-01-15T10:23:45.123000"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client(&server.uri(), Some("otx-key")).fetch_subscribed(3).await.unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].name.as_deref(), Some("Volt Typhoon"));
    }

    #[tokio::test]
    async fn test_upstream_error_carries_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "detail": "Authentication credentials were not provided."
            })))
            .mount(&server)
            .await;

        let err = client(&server.uri(), Some("bad")).fetch_subscribed(1).await.unwrap_err();
        match err {
            FeedError::Upstream { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Authentication credentials were not provided.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upstream_error_without_body_uses_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server.uri(), Some("key")).fetch_subscribed(1).await.unwrap_err();
        match err {
            FeedError::Upstream { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server.uri(), Some("key")).fetch_subscribed(1).await.unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)));
    }
}
