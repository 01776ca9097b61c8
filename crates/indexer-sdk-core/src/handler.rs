//! User-provided event handlers.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::types::RawEvent;

/// Error a handler returns to reject a message. The message is not acknowledged.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Processes events delivered by a subscription.
///
/// Returning `Ok(())` acknowledges the message; returning an error leaves it
/// unacknowledged so the broker redelivers it according to its own policy.
///
/// Any `Fn(String, u64, RawEvent) -> impl Future<Output = Result<(), HandlerError>>`
/// closure is a handler:
///
/// ```rust
/// use indexer_sdk_core::handler::{EventHandler, HandlerError};
/// use indexer_sdk_core::types::RawEvent;
///
/// let handler = |subject: String, seq: u64, event: RawEvent| async move {
///     println!("{subject}#{seq}: {}", event.event_id);
///     Ok::<(), HandlerError>(())
/// };
/// fn assert_handler<H: EventHandler>(_: &H) {}
/// assert_handler(&handler);
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Called once per delivered message with its subject and stream sequence.
    async fn handle(&self, subject: &str, sequence: u64, event: RawEvent) -> Result<(), HandlerError>;
}

#[async_trait]
impl<F, Fut> EventHandler for F
where
    F: Fn(String, u64, RawEvent) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    async fn handle(&self, subject: &str, sequence: u64, event: RawEvent) -> Result<(), HandlerError> {
        (self)(subject.to_string(), sequence, event).await
    }
}

/// Wraps a handler with logic that runs around it.
///
/// The wrapping handler decides whether to call the inner one. Returning an
/// error without calling it rejects the message, which then stays
/// unacknowledged. Any `Fn(Arc<dyn EventHandler>) -> Arc<dyn EventHandler>`
/// is a middleware.
pub trait Middleware: Send + Sync {
    fn wrap(&self, inner: Arc<dyn EventHandler>) -> Arc<dyn EventHandler>;
}

impl<F> Middleware for F
where
    F: Fn(Arc<dyn EventHandler>) -> Arc<dyn EventHandler> + Send + Sync,
{
    fn wrap(&self, inner: Arc<dyn EventHandler>) -> Arc<dyn EventHandler> {
        (self)(inner)
    }
}

/// Stack `layers` around `handler`.
///
/// ```text
/// layer(h, [a, b])  ==  a(b(h))      a sees each message first
/// ```
pub fn layer(handler: Arc<dyn EventHandler>, layers: &[Arc<dyn Middleware>]) -> Arc<dyn EventHandler> {
    layers.iter().rev().fold(handler, |inner, m| m.wrap(inner))
}
