//! indexer-sdk-core — data model and transport-independent pieces of the
//! event indexer SDK.
//!
//! # Overview
//!
//! An application describes the contracts it tracks in a [`Config`],
//! registers it with the indexer over HTTP ([`RegistrationClient`]), then
//! attaches an [`EventHandler`] to a durable queue consumer through an
//! [`IndexerSdk`] implementation (see `indexer-sdk-nats`).
//!
//! - [`types`] — `Config`, `Contract`, `RawEvent`, `RegisterResponse`
//! - [`felt`] / [`call`] — field elements and read-only contract calls
//! - [`rpc`] — JSON-RPC provider trait and HTTP transport
//! - [`handler`] / [`codec`] / [`delivery`] — the per-message contract
//! - [`registration`] — `POST {api}/register`
//! - [`sdk`] — the `IndexerSdk` / `Subscription` traits

pub mod call;
pub mod codec;
pub mod delivery;
pub mod error;
pub mod felt;
pub mod handler;
pub mod registration;
pub mod rpc;
pub mod sdk;
pub mod types;

pub use call::BlockId;
pub use codec::{JsonCodec, PayloadCodec};
pub use delivery::{process_message, Delivery, InboundMessage};
pub use error::SdkError;
pub use felt::{selector_from_name, Felt};
pub use handler::{layer, EventHandler, HandlerError, Middleware};
pub use registration::RegistrationClient;
pub use rpc::{HttpRpcProvider, RpcProvider};
pub use sdk::{IndexerSdk, Subscription};
pub use types::{Config, Contract, RawEvent, RegisterResponse};
