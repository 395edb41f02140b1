// JSON-RPC over HTTP call primitive
// reason: reqwest for HTTP POST with a per-call timeout
use crate::types::{RpcRequest, RpcResponse, REQUEST_ID};
use serde::de::DeserializeOwned;
use serde::Serialize;
use stabilizer_core::{AgentError, Result};
use std::time::Duration;
use tracing::debug;

/// Build `protocol://host:port`
pub fn build_endpoint(protocol: &str, host: &str, port: u16) -> String {
    format!("{}://{}:{}", protocol, host, port)
}

/// Generic JSON-RPC client (no policy knowledge)
///
/// One POST per call, no retries. Failures are classified as:
/// - `AgentError::Transport` - connection, timeout, or body read failure
/// - `AgentError::Decode` - non-JSON body or result of the wrong shape
/// - `AgentError::Rpc` - response carries a populated `error` object
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RpcClient {
    /// Create a client for `endpoint` with a per-call timeout
    ///
    /// # Example
    /// ```ignore
    /// let client = RpcClient::new("http://127.0.0.1:9334", Duration::from_secs(60))?;
    /// ```
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Call `method` and decode its `result` as `T`
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<T> {
        self.send(method, params.as_ref()).await
    }

    /// Call `method` with typed params serialized directly into the body
    ///
    /// Unlike [`RpcClient::call`], the params never pass through
    /// `serde_json::Value`, so numbers keep the exact form their
    /// `Serialize` impl writes.
    pub async fn call_with_params<T, P>(&self, method: &str, params: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        self.send(method, Some(params)).await
    }

    async fn send<T, P>(&self, method: &str, params: Option<&P>) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let request = RpcRequest {
            method,
            params,
            id: REQUEST_ID,
        };

        debug!(method = %method, endpoint = %self.endpoint, "RPC call");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Transport(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            AgentError::Transport(format!("{} response read failed: {}", method, e))
        })?;

        let envelope: RpcResponse = serde_json::from_slice(&body).map_err(|e| {
            AgentError::Decode(format!(
                "{} returned a non-JSON-RPC body (HTTP {}): {}",
                method, status, e
            ))
        })?;

        if let Some(error) = envelope.error {
            return Err(AgentError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = envelope
            .result
            .ok_or_else(|| AgentError::Decode(format!("{} returned no result", method)))?;

        serde_json::from_value(result).map_err(|e| {
            AgentError::Decode(format!("{} result has unexpected shape: {}", method, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubLedgerNode;
    use serde_json::json;
    use std::collections::HashMap;

    fn client(url: &str) -> RpcClient {
        RpcClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_build_endpoint() {
        assert_eq!(
            build_endpoint("http", "127.0.0.1", 9334),
            "http://127.0.0.1:9334"
        );
    }

    #[tokio::test]
    async fn test_call_sends_envelope_and_decodes_result() {
        let node = StubLedgerNode::start(|_| {
            let body = json!({"id": 0, "result": {"coin": 1.5}, "error": null});
            (200, body.to_string())
        })
        .await
        .unwrap();

        let result: HashMap<String, f64> = client(&node.url())
            .call("getNumberOfCoinsAndBonds", None)
            .await
            .unwrap();

        assert_eq!(result["coin"], 1.5);
        let requests = node.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0],
            json!({"method": "getNumberOfCoinsAndBonds", "params": null, "id": 0})
        );
    }

    #[tokio::test]
    async fn test_call_domain_error() {
        let node = StubLedgerNode::start(|_| {
            let body = json!({
                "id": 0,
                "result": null,
                "error": {"code": -3, "message": "invalid signature"}
            });
            (200, body.to_string())
        })
        .await
        .unwrap();

        let err = client(&node.url())
            .call::<String>("createActionParamsTrasaction", Some(json!([{}])))
            .await
            .unwrap_err();

        match err {
            AgentError::Rpc { code, message } => {
                assert_eq!(code, -3);
                assert_eq!(message, "invalid signature");
            }
            other => panic!("expected RPC error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_call_non_json_body_is_decode_error() {
        let node = StubLedgerNode::start(|_| (502, "<html>bad gateway</html>".to_string()))
            .await
            .unwrap();

        let err = client(&node.url())
            .call::<String>("anything", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Decode(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_call_schema_mismatch_is_decode_error() {
        let node = StubLedgerNode::start(|_| (200, json!({"id": 0, "result": 42}).to_string()))
            .await
            .unwrap();

        let err = client(&node.url())
            .call::<String>("createActionParamsTrasaction", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Decode(_)));
    }

    #[tokio::test]
    async fn test_call_missing_result_is_decode_error() {
        let node = StubLedgerNode::start(|_| {
            let body = json!({"id": 0, "result": null, "error": null});
            (200, body.to_string())
        })
        .await
        .unwrap();

        let err = client(&node.url())
            .call::<String>("createActionParamsTrasaction", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Decode(_)));
    }

    #[tokio::test]
    async fn test_call_unreachable_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}", addr))
            .call::<String>("getNumberOfCoinsAndBonds", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Transport(_)));
        assert!(err.is_retryable());
    }
}
