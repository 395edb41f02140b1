// Supply Snapshot - coin and bond counts read from the ledger each cycle

use crate::domain::error::{DecisionError, Result};
use serde::{Deserialize, Serialize};

/// Ledger quantity key for circulating coins
pub const COIN_QUANTITY_KEY: &str = "coin";

/// Ledger quantity key for outstanding bonds
pub const BOND_QUANTITY_KEY: &str = "bond";

/// Point-in-time coin and bond supply (never cached across cycles)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupplySnapshot {
    pub coins: f64,
    pub bonds: f64,
}

impl SupplySnapshot {
    pub fn new(coins: f64, bonds: f64) -> Self {
        Self { coins, bonds }
    }

    /// Reject counts the ledger could never report
    pub fn validate(&self) -> Result<()> {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if valid(self.coins) && valid(self.bonds) {
            Ok(())
        } else {
            Err(DecisionError::InvalidSupply {
                coins: self.coins,
                bonds: self.bonds,
            })
        }
    }
}
