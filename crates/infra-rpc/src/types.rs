//! JSON-RPC Envelope Types
//!
//! The ledger node speaks a minimal JSON-RPC dialect: no `jsonrpc` version
//! field, a fixed request id of 0, and responses discriminated by whether
//! `error` is populated.

use serde::{Deserialize, Serialize};

/// Request id sent with every call
pub const REQUEST_ID: i64 = 0;

/// `{"method": ..., "params": [...] | null, "id": 0}`
///
/// Params are borrowed and serialized straight into the body.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a, P = serde_json::Value> {
    pub method: &'a str,
    pub params: Option<&'a P>,
    pub id: i64,
}

/// `{"id": ..., "result": ..., "error": {...} | null}`
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// Server-reported failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}
