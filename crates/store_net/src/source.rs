//! [`FetchSource`] over NATS request/reply.
//!
//! The query is encoded and sent on a fixed subject; the list service
//! answers with a [`ListReply`] carrying the full ordered entity list.

use std::marker::PhantomData;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use store_core::FetchSource;
use store_entity::Entity;

use crate::codec::{self, Encoding};
use crate::connection::{NatsConnection, resolve_url};
use crate::error::NetError;
use crate::messages::ListReply;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a [`NatsSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatsSourceConfig {
    /// Subject the list service answers on (e.g. `"dualtext.search"`).
    pub subject: String,
    /// Optional NATS URL override (defaults to `NATS_URL` env or localhost).
    pub nats_url: Option<String>,
    /// How long to wait for a reply.
    pub timeout: Duration,
    /// Payload encoding.
    pub encoding: Encoding,
}

impl NatsSourceConfig {
    /// Create a config for the given subject with default timeout and
    /// encoding.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            nats_url: None,
            timeout: DEFAULT_TIMEOUT,
            encoding: Encoding::default(),
        }
    }

    /// Override the NATS URL.
    #[must_use]
    pub fn with_nats_url(mut self, url: impl Into<String>) -> Self {
        self.nats_url = Some(url.into());
        self
    }

    /// Override the reply timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the payload encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Fetches complete lists of `E` by sending `Q` to a NATS list service.
#[derive(Debug)]
pub struct NatsSource<Q, E> {
    conn: NatsConnection,
    config: NatsSourceConfig,
    _marker: PhantomData<fn(&Q) -> Vec<E>>,
}

impl<Q, E> NatsSource<Q, E> {
    /// Build a source on an existing connection.
    #[must_use]
    pub fn new(conn: NatsConnection, config: NatsSourceConfig) -> Self {
        Self {
            conn,
            config,
            _marker: PhantomData,
        }
    }

    /// Connect using the config's URL (or the environment default).
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if the connection cannot be established.
    pub async fn connect(config: NatsSourceConfig) -> Result<Self, NetError> {
        let url = resolve_url(config.nats_url.as_deref());
        let conn = NatsConnection::connect_to(&url).await?;
        Ok(Self::new(conn, config))
    }

    /// Returns the source configuration.
    #[must_use]
    pub fn config(&self) -> &NatsSourceConfig {
        &self.config
    }
}

/// Decode a [`ListReply`] payload into its entity list.
///
/// # Errors
///
/// Returns a codec error for undecodable bytes, [`NetError::Remote`] for an
/// error reply and [`NetError::EmptyReply`] when the reply carries neither.
pub fn decode_reply<E>(encoding: Encoding, bytes: &[u8]) -> Result<Vec<E>, NetError>
where
    E: Entity + DeserializeOwned,
{
    let reply: ListReply<E> = codec::decode(encoding, bytes)?;
    reply.into_result()
}

impl<Q, E> FetchSource for NatsSource<Q, E>
where
    Q: Serialize + Send + Sync + 'static,
    E: Entity + DeserializeOwned,
{
    type Query = Q;
    type Entity = E;
    type Error = NetError;

    async fn fetch(&self, query: &Q) -> Result<Vec<E>, NetError> {
        let payload = codec::encode(self.config.encoding, query)?;
        let reply = self
            .conn
            .request(&self.config.subject, payload, self.config.timeout)
            .await?;
        let entities: Vec<E> = decode_reply(self.config.encoding, &reply)?;
        debug!(
            subject = self.config.subject,
            count = entities.len(),
            "list fetched"
        );
        Ok(entities)
    }
}
