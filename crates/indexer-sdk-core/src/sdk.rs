//! The `IndexerSdk` trait implemented by each queue transport.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::SdkError;
use crate::handler::EventHandler;
use crate::types::{Config, RegisterResponse};

/// Handle to a running handler registration.
#[async_trait]
pub trait Subscription: Send + Sync {
    /// Delete the durable consumer and stop local delivery.
    ///
    /// A consumer that no longer exists counts as deleted; other deletion
    /// failures are logged, never returned. Calling twice attempts deletion twice.
    async fn cancel(&self);
}

/// Client-side entry point: register an application, then attach handlers.
#[async_trait]
pub trait IndexerSdk: Send + Sync {
    type Subscription: Subscription;

    /// Register `config` with the remote indexer.
    async fn configure(&self, config: &Config) -> Result<RegisterResponse, SdkError>;

    /// Attach `handler` to the durable consumer `name`, filtered to `subject`.
    ///
    /// Connection and consumer setup failures are returned here; failures
    /// while processing individual messages are only logged.
    async fn register_handler(
        &self,
        name: &str,
        subject: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<Self::Subscription, SdkError>;
}
