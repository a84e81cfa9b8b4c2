//! HTTP client for the relay's monitoring API.
//!
//! Four endpoints are consumed: aggregate stats, the failed-message list
//! (DLQ), the health check, and the per-message retry action. The messages
//! endpoint can report an error as data - a 2xx response whose body is an
//! error object instead of the expected array - so its body is decoded into
//! an explicit [`MessagesBody`] variant rather than sniffed for fields.
//!
//! ## Example
//!
//! ```rust,no_run
//! use relay_doctor::api::{ApiClient, MessagesBody};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::builder()
//!         .endpoint("http://localhost:8080")
//!         .build()?;
//!
//!     if let MessagesBody::Messages(messages) = client.fetch_failed_messages().await? {
//!         for message in &messages {
//!             println!("{} {}", message.id, message.status.label());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::data::health::{HealthBody, HealthCheck, SystemStatus};
use crate::data::message::Hl7Message;
use crate::data::stats::RelayStats;

/// Errors from backend API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Backend answered with a non-success HTTP status.
    #[error("backend returned {0}")]
    Http(StatusCode),

    /// Response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timed out waiting for the backend.
    #[error("request timed out")]
    Timeout,

    /// Any other transport failure.
    #[error("request failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// True when no well-formed backend response arrived at all, as opposed
    /// to the backend answering with an error status.
    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::Http(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Body of the messages endpoint.
///
/// The backend signals some failures as data: a 2xx response carrying an
/// object with a `message` field instead of the expected array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessagesBody {
    /// The failed-message list.
    Messages(Vec<Hl7Message>),
    /// An error reported in-band.
    Error(BackendError),
}

/// In-band error object from the backend.
#[derive(Debug, Deserialize)]
pub struct BackendError {
    pub message: String,
}

/// Client for the relay's monitoring API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
}

impl ApiClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Fetch the aggregate delivery counters.
    pub async fn fetch_stats(&self) -> Result<RelayStats, ApiError> {
        let url = format!("{}/api/stats", self.endpoint);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::Http(response.status()));
        }

        Ok(response.json().await?)
    }

    /// Fetch the failed-message list from the DLQ.
    pub async fn fetch_failed_messages(&self) -> Result<MessagesBody, ApiError> {
        let url = format!("{}/api/messages", self.endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[("status", "failed")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Http(response.status()));
        }

        Ok(response.json().await?)
    }

    /// Check backend health and classify the outcome.
    ///
    /// Never fails: transport errors and non-success statuses classify as
    /// [`SystemStatus::ConnectionError`], a 2xx body as running or degraded.
    pub async fn check_health(&self) -> HealthCheck {
        let url = format!("{}/api/health", self.endpoint);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<HealthBody>().await {
                    Ok(body) => HealthCheck {
                        status: SystemStatus::from_body(&body),
                        body: Some(body),
                    },
                    // A success response with an undecodable body still
                    // means the backend is up, just not healthy.
                    Err(_) => HealthCheck {
                        status: SystemStatus::Degraded,
                        body: None,
                    },
                }
            }
            Ok(_) | Err(_) => HealthCheck {
                status: SystemStatus::ConnectionError,
                body: None,
            },
        }
    }

    /// Ask the backend to requeue a failed message. The response body is
    /// ignored; any 2xx counts as accepted.
    pub async fn retry_message(&self, id: &str) -> Result<(), ApiError> {
        let url = format!("{}/api/messages/{}/retry", self.endpoint, id);
        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::Http(response.status()));
        }

        Ok(())
    }

    /// The configured backend base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Builder for [`ApiClient`].
#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    /// Set the backend base URL (e.g. "http://localhost:8080").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:8080".to_string());

        Ok(ApiClient {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}
