//! Durable consumer binding and the background delivery task.
//!
//! ```text
//! connect ──▶ create-or-update consumer on EVENTS ──▶ messages()
//!                                                        │
//!                                  delivery task ◀───────┘
//!                                        │
//!                    process_message (decode → handler → ack)
//! ```

use async_nats::jetstream::{self, consumer::pull};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use indexer_sdk_core::{
    delivery::{process_message, InboundMessage},
    EventHandler, PayloadCodec, SdkError,
};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Stream every durable consumer is bound to.
pub const STREAM_NAME: &str = "EVENTS";

/// Pull consumer configuration for a named, durable, filtered consumer.
pub fn consumer_config(name: &str, subject: &str) -> pull::Config {
    pull::Config {
        name: Some(name.to_string()),
        durable_name: Some(name.to_string()),
        filter_subject: subject.to_string(),
        ..Default::default()
    }
}

/// Open a connection to the NATS server. An empty token connects without auth.
pub async fn connect(url: &str, token: &str) -> Result<async_nats::Client, SdkError> {
    let options = if token.is_empty() {
        async_nats::ConnectOptions::new()
    } else {
        async_nats::ConnectOptions::with_token(token.to_string())
    };

    options.connect(url).await.map_err(|e| {
        error!(url, error = %e, "failed to connect to nats");
        SdkError::Connect(e.to_string())
    })
}

/// Create the consumer on [`STREAM_NAME`], or reconcile an existing one with
/// the same name to `subject`.
pub async fn bind_consumer(
    js: &jetstream::Context,
    name: &str,
    subject: &str,
) -> Result<jetstream::consumer::Consumer<pull::Config>, SdkError> {
    js.create_consumer_on_stream(consumer_config(name, subject), STREAM_NAME)
        .await
        .map_err(|e| {
            error!(consumer = name, subject, error = %e, "failed to create or update consumer");
            SdkError::Consumer(e.to_string())
        })
}

/// A JetStream message seen through [`InboundMessage`].
pub struct NatsMessage(pub jetstream::Message);

#[async_trait]
impl InboundMessage for NatsMessage {
    fn subject(&self) -> &str {
        self.0.subject.as_str()
    }

    fn sequence(&self) -> Option<u64> {
        match self.0.info() {
            Ok(info) => Some(info.stream_sequence),
            Err(e) => {
                debug!(error = %e, "message metadata unavailable");
                None
            }
        }
    }

    fn payload(&self) -> &[u8] {
        &self.0.payload
    }

    async fn ack(&self) -> Result<(), SdkError> {
        self.0.ack().await.map_err(|e| SdkError::Consumer(e.to_string()))
    }
}

/// Spawn the task that feeds `messages` through `handler` one at a time.
///
/// The task ends when `stop` flips to `true`, when its sender is dropped, or
/// when the message stream ends. Stream-level errors are logged and skipped.
pub fn spawn_delivery<S, M, E>(
    consumer: String,
    messages: S,
    codec: Arc<dyn PayloadCodec>,
    handler: Arc<dyn EventHandler>,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    S: Stream<Item = Result<M, E>> + Send + 'static,
    M: InboundMessage + 'static,
    E: Display + Send + 'static,
{
    tokio::spawn(async move {
        tokio::pin!(messages);
        debug!(consumer = %consumer, "delivery started");

        loop {
            tokio::select! {
                biased;

                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                next = messages.next() => match next {
                    Some(Ok(msg)) => {
                        process_message(&msg, codec.as_ref(), handler.as_ref()).await;
                    }
                    Some(Err(e)) => {
                        warn!(consumer = %consumer, error = %e, "message stream error");
                    }
                    None => {
                        debug!(consumer = %consumer, "message stream closed");
                        break;
                    }
                },
            }
        }

        debug!(consumer = %consumer, "delivery stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexer_sdk_core::{HandlerError, JsonCodec, RawEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct TestMessage {
        sequence: u64,
        payload: Vec<u8>,
        acks: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl InboundMessage for TestMessage {
        fn subject(&self) -> &str {
            "yielder:deposit"
        }

        fn sequence(&self) -> Option<u64> {
            Some(self.sequence)
        }

        fn payload(&self) -> &[u8] {
            &self.payload
        }

        async fn ack(&self) -> Result<(), SdkError> {
            self.acks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn event_payload(id: &str) -> Vec<u8> {
        JsonCodec::encode(&RawEvent {
            recorded_at: chrono::Utc::now(),
            event_id: id.into(),
            from_address: "0x1".into(),
            keys: vec![],
            data: vec![],
        })
        .unwrap()
    }

    fn counting_handler(calls: Arc<AtomicUsize>) -> Arc<dyn EventHandler> {
        Arc::new(move |_s: String, seq: u64, _e: RawEvent| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if seq == 2 {
                    Err::<(), HandlerError>("reject".into())
                } else {
                    Ok(())
                }
            }
        })
    }

    #[test]
    fn durable_filtered_config() {
        let cfg = consumer_config("portfolio", "yielder:deposit");
        assert_eq!(cfg.name.as_deref(), Some("portfolio"));
        assert_eq!(cfg.durable_name.as_deref(), Some("portfolio"));
        assert_eq!(cfg.filter_subject, "yielder:deposit");
    }

    #[tokio::test]
    async fn delivers_until_stream_ends() {
        let acks = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let items: Vec<Result<TestMessage, String>> = vec![
            Ok(TestMessage { sequence: 1, payload: event_payload("a"), acks: acks.clone() }),
            Err("missed heartbeat".to_string()),
            Ok(TestMessage { sequence: 2, payload: event_payload("b"), acks: acks.clone() }),
            Ok(TestMessage { sequence: 3, payload: b"garbage".to_vec(), acks: acks.clone() }),
            Ok(TestMessage { sequence: 4, payload: event_payload("d"), acks: acks.clone() }),
        ];
        let (_stop_tx, stop_rx) = watch::channel(false);

        let task = spawn_delivery(
            "test".into(),
            futures::stream::iter(items),
            Arc::new(JsonCodec),
            counting_handler(calls.clone()),
            stop_rx,
        );
        task.await.unwrap();

        // seq 3 never reaches the handler; seq 2 is rejected by it
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(acks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stop_signal_ends_delivery() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = spawn_delivery(
            "test".into(),
            futures::stream::pending::<Result<TestMessage, String>>(),
            Arc::new(JsonCodec),
            counting_handler(calls.clone()),
            stop_rx,
        );
        stop_tx.send_replace(true);

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("delivery task did not stop")
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dropping_the_sender_ends_delivery() {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = spawn_delivery(
            "test".into(),
            futures::stream::pending::<Result<TestMessage, String>>(),
            Arc::new(JsonCodec),
            counting_handler(Arc::default()),
            stop_rx,
        );
        drop(stop_tx);

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("delivery task did not stop")
            .unwrap();
    }
}
