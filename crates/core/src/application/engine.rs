//! Stabilization Engine - decides one monetary policy adjustment per cycle
//!
//! Given the current supply and exchange rate:
//! - Expansion (demand exceeds supply): mint coins at the pace of the
//!   issuance tier covering the rate, scaled up when the unmet demand
//!   exceeds what the tier releases at its normal pace
//! - Contraction (rate at or below peg): issue bonds and set the tax of the
//!   contraction tier covering the rate
//!
//! The engine is pure: identical inputs always yield an identical decision.
//! It fails closed when no tier covers the rate.

use crate::domain::error::{DecisionError, Result};
use crate::domain::{
    Decision, Direction, PolicyAdjustment, RuleTables, SupplySnapshot,
    AVERAGE_BLOCK_INTERVAL_SECS,
};
use std::sync::Arc;

/// Policy engine bound to the process-wide rule tables
#[derive(Debug, Clone)]
pub struct StabilizationEngine {
    tables: Arc<RuleTables>,
    average_block_interval_secs: f64,
}

impl StabilizationEngine {
    /// Engine using the ledger's standard block interval
    pub fn new(tables: Arc<RuleTables>) -> Self {
        Self {
            tables,
            average_block_interval_secs: AVERAGE_BLOCK_INTERVAL_SECS,
        }
    }

    /// Engine for a ledger with a different block interval
    pub fn with_block_interval(tables: Arc<RuleTables>, secs: f64) -> Result<Self> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(DecisionError::InvalidTable(format!(
                "average block interval must be positive, got {}",
                secs
            )));
        }
        Ok(Self {
            tables,
            average_block_interval_secs: secs,
        })
    }

    pub fn tables(&self) -> &RuleTables {
        &self.tables
    }

    pub fn decide(&self, supply: &SupplySnapshot, rate: f64) -> Result<Decision> {
        decide(supply, rate, &self.tables, self.average_block_interval_secs)
    }
}

/// Pure decision function
///
/// # Errors
/// - `InvalidRate` for a negative or non-finite rate
/// - `InvalidSupply` for negative or non-finite counts
/// - `NoIssuanceTier` / `NoContractionTier` when no tier covers the rate
/// - `InvalidTable` when the matched issuance tier releases nothing
pub fn decide(
    supply: &SupplySnapshot,
    rate: f64,
    tables: &RuleTables,
    average_block_interval_secs: f64,
) -> Result<Decision> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(DecisionError::InvalidRate(rate));
    }
    supply.validate()?;

    let demand = rate * supply.coins;
    let diff = demand - supply.coins;

    if diff > 0.0 {
        expand(diff, supply.bonds, rate, tables, average_block_interval_secs)
    } else {
        contract(rate, tables)
    }
}

fn expand(
    diff: f64,
    bonds: f64,
    rate: f64,
    tables: &RuleTables,
    average_block_interval_secs: f64,
) -> Result<Decision> {
    // Outstanding bonds are redeemed before new coins are minted
    let auto_needed = diff - bonds;
    if auto_needed <= 0.0 {
        return Ok(Decision::NoOp {
            demand_gap: diff,
            bonds,
        });
    }

    let tier = tables
        .issuance
        .lookup(rate)
        .ok_or(DecisionError::NoIssuanceTier { rate })?;

    let normal_pace =
        (tier.window_seconds as f64 * tier.coins_per_window) / average_block_interval_secs;
    if normal_pace <= 0.0 {
        return Err(DecisionError::InvalidTable(format!(
            "issuance tier [{}, {}) releases no coins",
            tier.min, tier.max
        )));
    }

    let num_of_coins = if normal_pace >= auto_needed {
        tier.coins_per_window
    } else {
        (auto_needed / normal_pace) * tier.coins_per_window
    };

    Ok(Decision::Act(PolicyAdjustment {
        direction: Direction::Expansion,
        num_of_coins,
        num_of_bonds: 0.0,
        tax: 0.0,
    }))
}

fn contract(rate: f64, tables: &RuleTables) -> Result<Decision> {
    let tier = tables
        .contraction
        .lookup(rate)
        .ok_or(DecisionError::NoContractionTier { rate })?;

    Ok(Decision::Act(PolicyAdjustment {
        direction: Direction::Contraction,
        num_of_coins: 0.0,
        num_of_bonds: tier.bonds_to_issue,
        tax: tier.tax_percent,
    }))
}
