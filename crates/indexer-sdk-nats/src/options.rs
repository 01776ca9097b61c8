//! Connection options: environment defaults plus explicit overrides.

use std::time::Duration;

pub const ENV_TOKEN: &str = "INDEXER_TOKEN";
pub const ENV_URL: &str = "INDEXER_URL";
pub const ENV_API: &str = "INDEXER_API";
pub const ENV_API_KEY: &str = "INDEXER_API_KEY";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection parameters captured when the SDK is built.
///
/// No validation happens here: an empty token or URL is accepted and fails
/// later, when connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkOptions {
    /// Bearer token for the NATS server.
    pub token: String,
    /// NATS server URL, e.g. `nats://localhost:4222`.
    pub url: String,
    /// Indexer HTTP API base URL.
    pub api: String,
    pub api_key: String,
    /// Timeout for HTTP calls to the indexer API.
    pub request_timeout: Duration,
}

impl SdkOptions {
    /// Defaults from `INDEXER_TOKEN`, `INDEXER_URL`, `INDEXER_API` and
    /// `INDEXER_API_KEY`; unset variables become empty strings.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SdkOptions::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();
        Self {
            token: get(ENV_TOKEN),
            url: get(ENV_URL),
            api: get(ENV_API),
            api_key: get(ENV_API_KEY),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Default for SdkOptions {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_from_partial_environment() {
        let opts = SdkOptions::from_lookup(env(&[
            (ENV_TOKEN, "thisisasuperprivateroken"),
            (ENV_URL, "http://localhost:9999"),
        ]));

        assert_eq!(opts.token, "thisisasuperprivateroken");
        assert_eq!(opts.url, "http://localhost:9999");
        assert_eq!(opts.api, "");
        assert_eq!(opts.api_key, "");
        assert_eq!(opts.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_process_environment() {
        std::env::set_var(ENV_TOKEN, "env-token");
        std::env::set_var(ENV_URL, "nats://env:4222");
        std::env::set_var(ENV_API, "http://env-api");
        std::env::set_var(ENV_API_KEY, "env-key");

        let opts = SdkOptions::from_env();

        assert_eq!(opts.token, "env-token");
        assert_eq!(opts.url, "nats://env:4222");
        assert_eq!(opts.api, "http://env-api");
        assert_eq!(opts.api_key, "env-key");
    }

    #[test]
    fn default_is_empty() {
        let opts = SdkOptions::default();
        assert!(opts.token.is_empty() && opts.url.is_empty());
    }
}
