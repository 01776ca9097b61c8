//! Teardown of a handler registration.

use async_nats::jetstream::{
    self,
    stream::{ConsumerError, ConsumerErrorKind},
    ErrorCode,
};
use async_trait::async_trait;
use indexer_sdk_core::{SdkError, Subscription};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error};

use crate::consumer::STREAM_NAME;

/// Result of a consumer deletion that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// The consumer was already gone.
    NotFound,
}

/// Broker-side consumer administration.
#[async_trait]
pub trait ConsumerAdmin: Send + Sync {
    async fn delete_consumer(&self, stream: &str, name: &str) -> Result<Deletion, SdkError>;
}

#[async_trait]
impl ConsumerAdmin for jetstream::Context {
    async fn delete_consumer(&self, stream: &str, name: &str) -> Result<Deletion, SdkError> {
        deletion_outcome(self.delete_consumer_from_stream(name, stream).await.map(|_| ()))
    }
}

/// Map the broker's reply to a delete request. "Consumer not found" is not a failure.
fn deletion_outcome(result: Result<(), ConsumerError>) -> Result<Deletion, SdkError> {
    match result {
        Ok(()) => Ok(Deletion::Deleted),
        Err(e) => match e.kind() {
            ConsumerErrorKind::JetStream(js) if js.error_code() == ErrorCode::CONSUMER_NOT_FOUND => {
                Ok(Deletion::NotFound)
            }
            _ => Err(SdkError::Consumer(e.to_string())),
        },
    }
}

/// Handle returned by [`NatsSdk::register_handler`](crate::NatsSdk).
///
/// [`cancel`](Subscription::cancel) deletes the durable consumer and stops
/// local delivery. Dropping the handle without cancelling only stops local
/// delivery; the durable consumer stays on the broker and keeps its position.
#[must_use = "dropping the subscription stops delivery; keep it and call `cancel` to tear down"]
pub struct NatsSubscription {
    name: String,
    admin: Arc<dyn ConsumerAdmin>,
    stop: watch::Sender<bool>,
}

impl NatsSubscription {
    pub(crate) fn new(name: impl Into<String>, admin: Arc<dyn ConsumerAdmin>, stop: watch::Sender<bool>) -> Self {
        Self {
            name: name.into(),
            admin,
            stop,
        }
    }

    /// Durable consumer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` once [`cancel`](Subscription::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.stop.borrow()
    }
}

#[async_trait]
impl Subscription for NatsSubscription {
    async fn cancel(&self) {
        match self.admin.delete_consumer(STREAM_NAME, &self.name).await {
            Ok(Deletion::Deleted) => debug!(consumer = %self.name, "consumer deleted"),
            Ok(Deletion::NotFound) => debug!(consumer = %self.name, "consumer already gone"),
            Err(e) => error!(consumer = %self.name, error = %e, "failed to delete consumer"),
        }
        self.stop.send_replace(true);
    }
}
