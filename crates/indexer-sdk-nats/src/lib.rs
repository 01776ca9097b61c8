//! indexer-sdk-nats — NATS JetStream transport for the event indexer SDK.
//!
//! ```text
//! NatsSdk::builder()          env defaults + overrides
//!     .build()?
//!     .configure(&config)     POST {api}/register
//!     .register_handler(..)   durable consumer on EVENTS → delivery task
//!         └─ NatsSubscription::cancel()   delete consumer, stop delivery
//! ```

pub mod cancel;
pub mod consumer;
pub mod options;
pub mod sdk;

pub use cancel::{ConsumerAdmin, Deletion, NatsSubscription};
pub use consumer::{NatsMessage, STREAM_NAME};
pub use options::SdkOptions;
pub use sdk::{NatsSdk, NatsSdkBuilder};
