//! HTTP client wrapper shared by the source adapters

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("request failed: {message}")]
    RequestFailed { message: String },
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
    #[error("could not read response body: {message}")]
    Body { message: String },
}

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Thin reqwest wrapper carrying the User-Agent and default timeout.
/// Status codes are passed through; each adapter decides what a non-200
/// response means for its source.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            user_agent: user_agent.to_string(),
        }
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| HttpError::RequestFailed {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| HttpError::Body {
            message: e.to_string(),
        })?;

        Ok(HttpResponse { status, body })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new("citegen/0.1 (https://github.com/citegen/citegen)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_with_default_user_agent() {
        let client = HttpClient::default();
        assert!(client.user_agent.starts_with("citegen/"));
    }
}
