// Stabilizer Infrastructure - Ledger RPC Adapter
// Implements: LedgerClient over JSON-RPC/HTTP

pub mod client;
pub mod ledger_client;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod stub;

pub use client::{build_endpoint, RpcClient};
pub use ledger_client::{JsonRpcLedgerClient, GET_SUPPLY_METHOD, SUBMIT_ACTION_METHOD};
pub use types::{RpcErrorObject, RpcRequest, RpcResponse};
