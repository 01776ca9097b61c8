//! Per-message delivery: decode, hand to the user handler, acknowledge.
//!
//! Transports adapt their message type to [`InboundMessage`] and call
//! [`process_message`] for each arrival. Every failure here is non-fatal:
//! it is logged and the message is left unacknowledged, so redelivery is
//! governed by the broker, not by the SDK.

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::codec::PayloadCodec;
use crate::error::SdkError;
use crate::handler::EventHandler;

/// A message received from the queue.
#[async_trait]
pub trait InboundMessage: Send + Sync {
    fn subject(&self) -> &str;

    /// Stream sequence from the message metadata, `None` if unavailable.
    fn sequence(&self) -> Option<u64>;

    fn payload(&self) -> &[u8];

    async fn ack(&self) -> Result<(), SdkError>;
}

/// Outcome of processing one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handler succeeded and the ack was sent.
    Acked,
    /// Payload did not decode; handler not called, message not acked.
    DecodeFailed,
    /// Handler returned an error; message not acked.
    HandlerFailed,
    /// Handler succeeded but the ack could not be sent.
    AckFailed,
}

impl Delivery {
    pub fn is_acked(&self) -> bool {
        matches!(self, Self::Acked)
    }
}

/// Run one message through `codec` and `handler`.
pub async fn process_message<M>(msg: &M, codec: &dyn PayloadCodec, handler: &dyn EventHandler) -> Delivery
where
    M: InboundMessage + ?Sized,
{
    let subject = msg.subject();
    let sequence = msg.sequence().unwrap_or_default();

    debug!(subject, sequence, "received message");

    let event = match codec.decode(msg.payload()) {
        Ok(e) => e,
        Err(e) => {
            error!(subject, sequence, codec = codec.name(), error = %e, "failed to decode raw event");
            return Delivery::DecodeFailed;
        }
    };

    if let Err(e) = handler.handle(subject, sequence, event).await {
        error!(subject, sequence, error = %e, "failed to consume message");
        return Delivery::HandlerFailed;
    }

    match msg.ack().await {
        Ok(()) => Delivery::Acked,
        Err(e) => {
            warn!(subject, sequence, error = %e, "failed to ack message");
            Delivery::AckFailed
        }
    }
}
