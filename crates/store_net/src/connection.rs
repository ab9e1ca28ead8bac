//! NATS connection management.
//!
//! A thin wrapper around `async-nats` with store-specific defaults and a
//! timed request helper.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::NetError;

/// Default NATS server URL.
pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// The environment variable used to override the NATS URL.
pub const NATS_URL_ENV: &str = "NATS_URL";

/// Resolve the NATS URL: explicit override, then `NATS_URL`, then
/// [`DEFAULT_NATS_URL`].
#[must_use]
pub fn resolve_url(url: Option<&str>) -> String {
    match url {
        Some(url) => url.to_string(),
        None => std::env::var(NATS_URL_ENV).unwrap_or_else(|_| DEFAULT_NATS_URL.to_string()),
    }
}

/// A wrapper around an `async-nats` client.
#[derive(Debug, Clone)]
pub struct NatsConnection {
    /// The underlying NATS client.
    client: async_nats::Client,
}

impl NatsConnection {
    /// Connect to NATS using the URL from the `NATS_URL` environment variable,
    /// falling back to [`DEFAULT_NATS_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if the connection cannot be established.
    pub async fn connect() -> Result<Self, NetError> {
        Self::connect_to(&resolve_url(None)).await
    }

    /// Connect to NATS at the specified URL.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if the connection cannot be established.
    pub async fn connect_to(url: &str) -> Result<Self, NetError> {
        info!(url, "connecting to NATS");
        let client = async_nats::connect(url).await?;
        info!("NATS connection established");
        Ok(Self { client })
    }

    /// Wrap an already connected client.
    #[must_use]
    pub fn from_client(client: async_nats::Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying `async-nats` client.
    #[must_use]
    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }

    /// Send a request and wait up to `timeout` for the reply payload.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Request`] if the request fails and
    /// [`NetError::Timeout`] if no reply arrives in time.
    pub async fn request(
        &self,
        subject: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, NetError> {
        debug!(subject, bytes = payload.len(), "sending request");
        let request = self.client.request(subject.to_string(), payload.into());
        let message = tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| NetError::Timeout {
                subject: subject.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })??;
        debug!(subject, bytes = message.payload.len(), "received reply");
        Ok(message.payload.to_vec())
    }
}
