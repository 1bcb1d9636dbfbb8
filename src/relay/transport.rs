//! Outbound delivery of encoded events.

use async_trait::async_trait;
use axum::http::{HeaderValue, header};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::domain::request_snapshot::X_FORWARDED_FOR;
use crate::error::RelayError;

/// A fully built outbound event call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Compact JSON body.
    pub body: Vec<u8>,
    /// Inbound `User-Agent`, omitted when the request had none.
    pub user_agent: Option<HeaderValue>,
    pub forwarded_for: Option<HeaderValue>,
}

/// Sends a [`Delivery`] to the analytics endpoint.
///
/// # Implementations
///
/// - [`HttpTransport`] - `reqwest` client posting to `{base_url}/api/event`
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Performs one delivery attempt.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::DeliveryTransport`] on network failure or
    /// timeout, [`RelayError::UnexpectedStatus`] on a non-2xx answer.
    async fn send(&self, delivery: Delivery) -> Result<(), RelayError>;
}

/// HTTP transport backed by a shared `reqwest::Client`.
///
/// The client is built once with the delivery timeout and cloned cheaply;
/// all requests share its connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Creates a transport posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if the HTTP client cannot be built.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    async fn send(&self, delivery: Delivery) -> Result<(), RelayError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(delivery.body);

        if let Some(user_agent) = delivery.user_agent {
            request = request.header(header::USER_AGENT, user_agent);
        }
        if let Some(forwarded_for) = delivery.forwarded_for {
            request = request.header(&X_FORWARDED_FOR, forwarded_for);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UnexpectedStatus(status));
        }

        Ok(())
    }
}
