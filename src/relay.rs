use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::models::Payload;

/// Default timeout for the outbound prediction request, in seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Outbound request failures, one variant per user-visible outcome.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Prediction API request timed out")]
    Timeout,
    #[error("Error communicating with prediction API: {0}")]
    Transport(String),
    #[error("Prediction API returned error: {status}")]
    Remote { status: u16, body: String },
}

/// Client for the external prediction service. Holds the base URL and
/// timeout fixed at construction so tests can point it at a local mock.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    base_url: String,
}

impl RelayClient {
    /// Build a client for the service at `base_url` (trailing slashes
    /// trimmed) with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(RelayClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send the payload to `{base_url}/predict` and return the remote
    /// JSON body verbatim. Exactly one attempt: this service is a thin
    /// relay and never retries on behalf of the browser.
    pub async fn submit(&self, payload: &Payload) -> Result<Value, RelayError> {
        let url = format!("{}/predict", self.base_url);

        let response = match self.http.post(&url).json(payload).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(RelayError::Timeout),
            Err(e) => return Err(RelayError::Transport(e.to_string())),
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                RelayError::Timeout
            } else {
                RelayError::Transport(e.to_string())
            }
        })
    }
}
