//! Registration documents and event records exchanged with the indexer.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, SdkError};

/// An application's indexer configuration.
///
/// Sent as the body of `POST {api}/register`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Application identifier. Must be non-empty for a meaningful registration.
    pub app_name: String,
    /// Tracked contracts, in declaration order.
    #[serde(default)]
    pub contracts: Vec<Contract>,
    /// First block the indexer should scan.
    #[serde(default)]
    pub start_block: u64,
}

/// A tracked on-chain contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contract {
    /// event type name → queue subject, e.g. `"Deposit" → "yielder:deposit"`
    #[serde(default)]
    pub events: BTreeMap<String, String>,
    pub name: String,
    /// Hex-encoded contract address (`0x...`).
    pub address: String,
}

impl Config {
    /// Parse a configuration from a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| SdkError::Decode(e.to_string()))
    }

    /// Load a configuration from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Keep only the contracts whose name matches `pattern`.
    ///
    /// `pattern` is an unanchored regular expression, so `"yielder"` matches
    /// `yielder_banegas_farm`. Order is preserved. A pattern that fails to
    /// compile matches nothing.
    pub fn filter_by_name(&self, pattern: &str) -> Config {
        let contracts = match Regex::new(pattern) {
            Ok(re) => self
                .contracts
                .iter()
                .filter(|c| re.is_match(&c.name))
                .cloned()
                .collect(),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "invalid contract name pattern");
                Vec::new()
            }
        };

        Config {
            app_name: self.app_name.clone(),
            contracts,
            start_block: self.start_block,
        }
    }

    /// Look up a contract by its exact name.
    pub fn contract(&self, name: &str) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.name == name)
    }
}

impl Contract {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            events: BTreeMap::new(),
            name: name.into(),
            address: address.into(),
        }
    }

    /// Map an event type to the subject it is published on.
    pub fn with_event(mut self, event: impl Into<String>, subject: impl Into<String>) -> Self {
        self.events.insert(event.into(), subject.into());
        self
    }

    /// Subject for a given event type, if tracked.
    pub fn subject_for(&self, event: &str) -> Option<&str> {
        self.events.get(event).map(String::as_str)
    }
}

/// An event pulled on-chain by the indexer and delivered through the queue.
///
/// `keys` and `data` decode from `null` or an absent field as empty lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub recorded_at: DateTime<Utc>,
    pub event_id: String,
    pub from_address: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keys: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The indexer's acknowledgement of a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub app_name: String,
    /// Opaque hash identifying the registered configuration.
    pub hash: String,
}
