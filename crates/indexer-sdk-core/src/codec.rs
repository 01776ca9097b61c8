//! Payload codecs for queue messages.

use crate::error::SdkError;
use crate::types::RawEvent;

/// Decodes a message body into a [`RawEvent`].
pub trait PayloadCodec: Send + Sync {
    fn decode(&self, payload: &[u8]) -> Result<RawEvent, SdkError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// JSON payloads (`{"recorded_at": ..., "event_id": ..., ...}`).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Encode an event the way the indexer publishes it.
    pub fn encode(event: &RawEvent) -> Result<Vec<u8>, SdkError> {
        Ok(serde_json::to_vec(event)?)
    }
}

impl PayloadCodec for JsonCodec {
    fn decode(&self, payload: &[u8]) -> Result<RawEvent, SdkError> {
        serde_json::from_slice(payload).map_err(|e| SdkError::Decode(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
