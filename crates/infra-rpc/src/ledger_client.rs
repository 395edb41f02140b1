// Ledger node adapter for the LedgerClient port
use crate::client::RpcClient;
use async_trait::async_trait;
use stabilizer_core::domain::{SignedAction, SupplySnapshot, BOND_QUANTITY_KEY, COIN_QUANTITY_KEY};
use stabilizer_core::port::LedgerClient;
use stabilizer_core::{AgentError, Result};
use std::collections::HashMap;
use tracing::info;

/// Read method: quantity name -> amount
pub const GET_SUPPLY_METHOD: &str = "getNumberOfCoinsAndBonds";

/// Write method: one signed action object, returns a transaction hash
/// (method name spelled as the ledger node registers it)
pub const SUBMIT_ACTION_METHOD: &str = "createActionParamsTrasaction";

/// LedgerClient backed by the node's JSON-RPC endpoint
pub struct JsonRpcLedgerClient {
    rpc: RpcClient,
}

impl JsonRpcLedgerClient {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedgerClient {
    async fn fetch_supply(&self) -> Result<SupplySnapshot> {
        let quantities: HashMap<String, f64> = self.rpc.call(GET_SUPPLY_METHOD, None).await?;

        let quantity = |key: &str| {
            quantities.get(key).copied().ok_or_else(|| {
                AgentError::Decode(format!(
                    "{} result has no '{}' quantity",
                    GET_SUPPLY_METHOD, key
                ))
            })
        };

        Ok(SupplySnapshot::new(
            quantity(COIN_QUANTITY_KEY)?,
            quantity(BOND_QUANTITY_KEY)?,
        ))
    }

    async fn submit_action(&self, action: &SignedAction) -> Result<String> {
        let tx_hash: String = self
            .rpc
            .call_with_params(SUBMIT_ACTION_METHOD, &[action])
            .await?;

        info!(
            agent_id = %action.agent_id(),
            tx_hash = %tx_hash,
            "Ledger accepted action"
        );
        Ok(tx_hash)
    }
}
