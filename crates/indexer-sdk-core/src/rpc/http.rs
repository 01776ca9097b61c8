//! HTTP transport for [`RpcProvider`](super::RpcProvider).
//!
//! One request, one attempt. Retries and failover are left to the caller.

use async_trait::async_trait;
use std::time::Duration;

use super::{JsonRpcRequest, JsonRpcResponse, RpcProvider};
use crate::error::SdkError;

#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    pub request_timeout: Duration,
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// JSON-RPC over HTTP POST.
pub struct HttpRpcProvider {
    url: String,
    http: reqwest::Client,
}

impl HttpRpcProvider {
    pub fn new(url: impl Into<String>, config: HttpProviderConfig) -> Result<Self, SdkError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }

    /// Create with the default 30s timeout.
    pub fn default_for(url: impl Into<String>) -> Result<Self, SdkError> {
        Self::new(url, HttpProviderConfig::default())
    }
}

#[async_trait]
impl RpcProvider for HttpRpcProvider {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, SdkError> {
        tracing::debug!(url = %self.url, method = %req.method, "rpc request");

        let resp = self.http.post(&self.url).json(&req).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SdkError::Http(format!("HTTP {status}: {body}")));
        }

        Ok(resp.json::<JsonRpcResponse>().await?)
    }

    fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::felt::Felt;
    use crate::types::Contract;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Answers `slot_count` at `latest` with `["0x3"]`, anything else with a contract error.
    async fn node(Json(req): Json<Value>) -> Json<Value> {
        let selector = req["params"][0]["entry_point_selector"].as_str().unwrap_or_default();
        let known = req["method"] == "starknet_call"
            && req["params"][1] == "latest"
            && selector == selector_hex("slot_count");
        if known {
            Json(json!({ "jsonrpc": "2.0", "id": req["id"], "result": ["0x3"] }))
        } else {
            Json(json!({
                "jsonrpc": "2.0",
                "id": req["id"],
                "error": { "code": 40, "message": "Contract error", "data": { "revert_error": "entry point not found" } },
            }))
        }
    }

    fn selector_hex(name: &str) -> String {
        crate::felt::selector_from_name(name).to_string()
    }

    fn project() -> Contract {
        Contract::new(
            "project",
            "0x0516d0acb6341dcc567e85dc90c8f64e0c33d3daba0a310157d6bba0656c8769",
        )
    }

    #[tokio::test]
    async fn call_round_trip() {
        let url = serve(Router::new().route("/", post(node))).await;
        let provider = HttpRpcProvider::default_for(&url).unwrap();
        assert_eq!(provider.url(), url);

        let out = project().call(&provider, "slot_count", &[]).await.unwrap();

        assert_eq!(out, vec![Felt::from(3u64)]);
    }

    #[tokio::test]
    async fn error_envelope_is_rpc_error() {
        let url = serve(Router::new().route("/", post(node))).await;
        let provider = HttpRpcProvider::default_for(&url).unwrap();

        let err = project().call(&provider, "not_a_function", &[]).await.unwrap_err();

        assert!(err.is_rpc_error(), "got {err:?}");
        match err {
            SdkError::Rpc(e) => {
                assert_eq!(e.code, 40);
                assert_eq!(e.message, "Contract error");
                assert_eq!(e.data.unwrap()["revert_error"], "entry point not found");
            }
            other => panic!("expected RPC error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let app = Router::new().route(
            "/",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "node overloaded") }),
        );
        let url = serve(app).await;
        let provider = HttpRpcProvider::default_for(&url).unwrap();

        let err = project().call(&provider, "slot_count", &[]).await.unwrap_err();

        assert!(!err.is_rpc_error());
        match err {
            SdkError::Http(msg) => assert!(msg.contains("500") && msg.contains("node overloaded")),
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        let url = serve(Router::new().route("/", post(|| async { "<html>gateway</html>" }))).await;
        let provider = HttpRpcProvider::default_for(&url).unwrap();

        let err = project().call(&provider, "slot_count", &[]).await.unwrap_err();

        assert!(matches!(err, SdkError::Decode(_)), "got {err:?}");
    }
}
