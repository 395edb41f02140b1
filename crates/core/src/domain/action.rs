//! Action - the monetary policy decision submitted to the ledger node
//!
//! An action is built unsigned, canonicalized, signed, then frozen into a
//! [`SignedAction`]. The canonical form is compact JSON with keys in
//! lexicographic order and integral numbers written without a fractional
//! part, so the bytes do not depend on map iteration order.

use serde::{Deserialize, Serialize, Serializer};

/// Integral values below this are written in plain decimal form; at and
/// above it the Go-style encoder switches to exponent form
const PLAIN_INTEGER_LIMIT: f64 = 1e21;

/// Direction of a policy adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Price above peg: mint coins
    Expansion,
    /// Price at or below peg: issue bonds and raise tax
    Contraction,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Expansion => "expansion",
            Direction::Contraction => "contraction",
        }
    }
}

/// Quantities decided by the stabilization engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyAdjustment {
    pub direction: Direction,
    pub num_of_coins: f64,
    pub num_of_bonds: f64,
    pub tax: f64,
}

/// Engine output for one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Outstanding bonds already absorb the excess demand
    NoOp { demand_gap: f64, bonds: f64 },
    Act(PolicyAdjustment),
}

/// Action payload before signing
///
/// Field declaration order is the lexicographic key order of the wire
/// format. Do not reorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedAction {
    #[serde(rename = "agentId")]
    pub agent_id: String,
    #[serde(rename = "eligibleAgentIDs")]
    pub eligible_agent_ids: Vec<String>,
    #[serde(rename = "numOfBonds", serialize_with = "canonical_number")]
    pub num_of_bonds: f64,
    #[serde(rename = "numOfCoins", serialize_with = "canonical_number")]
    pub num_of_coins: f64,
    #[serde(serialize_with = "canonical_number")]
    pub tax: f64,
}

impl UnsignedAction {
    pub fn new(
        agent_id: impl Into<String>,
        eligible_agent_ids: Vec<String>,
        adjustment: &PolicyAdjustment,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            eligible_agent_ids,
            num_of_bonds: adjustment.num_of_bonds,
            num_of_coins: adjustment.num_of_coins,
            tax: adjustment.tax,
        }
    }

    /// Deterministic byte encoding covered by the signature
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Attach a detached signature (base64), freezing the action
    pub fn into_signed(self, agent_sig: String) -> SignedAction {
        SignedAction {
            action: self,
            agent_sig,
        }
    }
}

/// Signed action as sent to `createActionParamsTrasaction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedAction {
    #[serde(flatten)]
    action: UnsignedAction,
    #[serde(rename = "agentSig")]
    agent_sig: String,
}

impl SignedAction {
    pub fn action(&self) -> &UnsignedAction {
        &self.action
    }

    pub fn agent_sig(&self) -> &str {
        &self.agent_sig
    }

    pub fn agent_id(&self) -> &str {
        &self.action.agent_id
    }

    /// Split into parts (for verification tooling)
    pub fn into_parts(self) -> (UnsignedAction, String) {
        (self.action, self.agent_sig)
    }
}

fn canonical_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    // every integral f64 below 1e21 converts to i128 exactly
    if value.is_finite() && value.fract() == 0.0 && value.abs() < PLAIN_INTEGER_LIMIT {
        serializer.serialize_i128(*value as i128)
    } else {
        serializer.serialize_f64(*value)
    }
}
