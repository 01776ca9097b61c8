//! HTTP client for the indexer's registration endpoint.

use std::time::Duration;

use crate::error::SdkError;
use crate::types::{Config, RegisterResponse};

const REGISTER_PATH: &str = "/register";
/// Header carrying the configured API key. The indexer's authentication scheme
/// is not published; this name is an assumption and the key is omitted when empty.
const API_KEY_HEADER: &str = "x-api-key";

/// Submits application configurations to `POST {api}/register`.
#[derive(Debug, Clone)]
pub struct RegistrationClient {
    api: String,
    api_key: String,
    http: reqwest::Client,
}

impl RegistrationClient {
    /// `api` is the indexer base URL; an empty `api_key` sends no key header.
    pub fn new(
        api: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SdkError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api: api.into(),
            api_key: api_key.into(),
            http,
        })
    }

    /// Full URL of the registration endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{REGISTER_PATH}", self.api.trim_end_matches('/'))
    }

    /// Register `config` with the indexer. Single attempt, no retry.
    pub async fn register(&self, config: &Config) -> Result<RegisterResponse, SdkError> {
        tracing::debug!(app_name = %config.app_name, "configure");

        let body = serde_json::to_vec(config)?;
        let mut req = self
            .http
            .post(self.endpoint())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        if !self.api_key.is_empty() {
            req = req.header(API_KEY_HEADER, &self.api_key);
        }

        let resp = req.send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(status, body = %body, "registration rejected");
            return Err(SdkError::Http(format!("HTTP {status}: {body}")));
        }

        let registered = resp.json::<RegisterResponse>().await?;
        tracing::debug!(app_name = %registered.app_name, hash = %registered.hash, "registered");
        Ok(registered)
    }
}
