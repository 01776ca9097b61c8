//! `NatsSdk` — the NATS JetStream implementation of [`IndexerSdk`].

use async_nats::jetstream;
use async_trait::async_trait;
use futures::StreamExt;
use indexer_sdk_core::{
    Config, EventHandler, IndexerSdk, JsonCodec, PayloadCodec, RegisterResponse,
    RegistrationClient, SdkError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error};

use crate::cancel::NatsSubscription;
use crate::consumer::{bind_consumer, connect, spawn_delivery, NatsMessage};
use crate::options::SdkOptions;

/// SDK instance. Options are fixed at construction.
///
/// # Example
/// ```rust,no_run
/// use indexer_sdk_core::{Config, IndexerSdk, RawEvent, Subscription, HandlerError};
/// use indexer_sdk_nats::NatsSdk;
/// use std::sync::Arc;
///
/// # async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
/// let sdk = NatsSdk::builder().api("http://localhost:3000").build()?;
/// let registered = sdk.configure(&config).await?;
/// println!("registered {} ({})", registered.app_name, registered.hash);
///
/// let sub = sdk
///     .register_handler(
///         "portfolio",
///         "yielder:deposit",
///         Arc::new(|subject: String, seq: u64, event: RawEvent| async move {
///             println!("{subject} #{seq}: {}", event.event_id);
///             Ok::<(), HandlerError>(())
///         }),
///     )
///     .await?;
/// // ...
/// sub.cancel().await;
/// # Ok(())
/// # }
/// ```
pub struct NatsSdk {
    opts: SdkOptions,
    registration: RegistrationClient,
    codec: Arc<dyn PayloadCodec>,
}

impl NatsSdk {
    /// Build from explicit options.
    pub fn new(opts: SdkOptions) -> Result<Self, SdkError> {
        let registration =
            RegistrationClient::new(opts.api.clone(), opts.api_key.clone(), opts.request_timeout)?;
        Ok(Self {
            opts,
            registration,
            codec: Arc::new(JsonCodec),
        })
    }

    /// Start a builder seeded from the `INDEXER_*` environment variables.
    pub fn builder() -> NatsSdkBuilder {
        NatsSdkBuilder::from_options(SdkOptions::from_env())
    }

    /// Replace the payload codec (JSON by default).
    pub fn with_codec(mut self, codec: Arc<dyn PayloadCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn options(&self) -> &SdkOptions {
        &self.opts
    }
}

#[async_trait]
impl IndexerSdk for NatsSdk {
    type Subscription = NatsSubscription;

    async fn configure(&self, config: &Config) -> Result<RegisterResponse, SdkError> {
        self.registration.register(config).await
    }

    async fn register_handler(
        &self,
        name: &str,
        subject: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<NatsSubscription, SdkError> {
        debug!(app_name = name, subject, "register handler");

        let client = connect(&self.opts.url, &self.opts.token).await?;
        let js = jetstream::new(client);
        let consumer = bind_consumer(&js, name, subject).await?;

        let messages = consumer.messages().await.map_err(|e| {
            error!(consumer = name, error = %e, "failed to consume stream");
            SdkError::Consumer(e.to_string())
        })?;

        let (stop_tx, stop_rx) = watch::channel(false);
        spawn_delivery(
            name.to_string(),
            messages.map(|item| item.map(NatsMessage)),
            self.codec.clone(),
            handler,
            stop_rx,
        );

        Ok(NatsSubscription::new(name, Arc::new(js), stop_tx))
    }
}

/// Fluent overrides on top of [`SdkOptions`]. Later calls win.
#[derive(Debug, Clone)]
pub struct NatsSdkBuilder {
    opts: SdkOptions,
}

impl NatsSdkBuilder {
    pub fn from_options(opts: SdkOptions) -> Self {
        Self { opts }
    }

    /// NATS bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.opts.token = token.into();
        self
    }

    /// NATS server URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.opts.url = url.into();
        self
    }

    /// Indexer API base URL.
    pub fn api(mut self, api: impl Into<String>) -> Self {
        self.opts.api = api.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.opts.api_key = key.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.opts.request_timeout = timeout;
        self
    }

    /// The options as they stand.
    pub fn build_options(self) -> SdkOptions {
        self.opts
    }

    pub fn build(self) -> Result<NatsSdk, SdkError> {
        NatsSdk::new(self.opts)
    }
}
