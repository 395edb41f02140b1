//! Rule Tables - exchange-rate tiers mapped to monetary policy responses
//!
//! Two tables are built once at startup and shared read-only:
//! - issuance tiers (price above peg): how many coins to mint per window
//! - contraction tiers (price at or below peg): bonds to issue and tax to levy
//!
//! Tier bounds are half-open `[min, max)`. A rate equal to a tier's `max`
//! belongs to the next tier.

use crate::domain::error::{DecisionError, Result};
use serde::{Deserialize, Serialize};

/// Coins (or bonds) released per window when the rate sits just off the peg
pub const NUMBER_AT_PEG: f64 = 7.5;

/// Average time between mined blocks on the ledger (seconds)
pub const AVERAGE_BLOCK_INTERVAL_SECS: f64 = 60.0;

/// Upper bound of the open-ended top issuance tier
pub const TOP_TIER_MAX_RATE: f64 = 999_999.0;

/// Common accessor for half-open rate bands
pub trait RateBand {
    fn min(&self) -> f64;
    fn max(&self) -> f64;

    /// `min <= rate < max`
    fn contains(&self, rate: f64) -> bool {
        rate >= self.min() && rate < self.max()
    }
}

/// Issuance tier: mint `coins_per_window` over `window_seconds`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceTier {
    pub min: f64,
    pub max: f64,
    pub coins_per_window: f64,
    pub window_seconds: u64,
}

impl RateBand for IssuanceTier {
    fn min(&self) -> f64 {
        self.min
    }
    fn max(&self) -> f64 {
        self.max
    }
}

/// Contraction tier: issue `bonds_to_issue` and set transaction tax to `tax_percent`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractionTier {
    pub min: f64,
    pub max: f64,
    pub tax_percent: f64,
    pub bonds_to_issue: f64,
}

impl RateBand for ContractionTier {
    fn min(&self) -> f64 {
        self.min
    }
    fn max(&self) -> f64 {
        self.max
    }
}

/// Ordered, immutable list of tiers
///
/// Sorted ascending by `min` on construction. Overlap between tiers is not
/// checked: the first tier (lowest `min`) containing a rate wins.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable<T> {
    tiers: Vec<T>,
}

impl<T: RateBand + Copy> RuleTable<T> {
    /// Build a table, rejecting empty or inverted bands
    pub fn new(mut tiers: Vec<T>) -> Result<Self> {
        for tier in &tiers {
            if !tier.min().is_finite() || !tier.max().is_finite() || tier.min() >= tier.max() {
                return Err(DecisionError::InvalidTable(format!(
                    "tier [{}, {}) is empty or not finite",
                    tier.min(),
                    tier.max()
                )));
            }
        }
        tiers.sort_by(|a, b| a.min().total_cmp(&b.min()));
        Ok(Self { tiers })
    }

    /// Find the tier whose `[min, max)` contains `rate`
    pub fn lookup(&self, rate: f64) -> Option<&T> {
        self.tiers.iter().find(|tier| tier.contains(rate))
    }

    pub fn tiers(&self) -> &[T] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

/// Both tables, as loaded at startup
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTables {
    pub issuance: RuleTable<IssuanceTier>,
    pub contraction: RuleTable<ContractionTier>,
}

/// JSON shape for overriding the built-in tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTablesDocument {
    pub issuance: Vec<IssuanceTier>,
    pub contraction: Vec<ContractionTier>,
}

impl RuleTables {
    pub fn new(issuance: Vec<IssuanceTier>, contraction: Vec<ContractionTier>) -> Result<Self> {
        Ok(Self {
            issuance: RuleTable::new(issuance)?,
            contraction: RuleTable::new(contraction)?,
        })
    }

    /// Parse tables from a JSON document
    ///
    /// ```text
    /// {"issuance": [{"min":1.0,"max":1.1,"coinsPerWindow":7.5,"windowSeconds":5400}],
    ///  "contraction": [{"min":0.9,"max":1.0,"taxPercent":25,"bondsToIssue":7.5}]}
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: RuleTablesDocument = serde_json::from_str(json)
            .map_err(|e| DecisionError::InvalidTable(e.to_string()))?;
        Self::new(doc.issuance, doc.contraction)
    }

    pub fn to_document(&self) -> RuleTablesDocument {
        RuleTablesDocument {
            issuance: self.issuance.tiers().to_vec(),
            contraction: self.contraction.tiers().to_vec(),
        }
    }
}

impl Default for RuleTables {
    /// Production tiers: the further the rate drifts from peg, the faster
    /// coins are minted or the higher the contraction tax.
    fn default() -> Self {
        let issue = |min, max, coins_per_window, window_minutes: u64| IssuanceTier {
            min,
            max,
            coins_per_window,
            window_seconds: window_minutes * 60,
        };
        let contract = |min, max, tax_percent| ContractionTier {
            min,
            max,
            tax_percent,
            bonds_to_issue: NUMBER_AT_PEG,
        };

        let issuance = vec![
            issue(1.0, 1.1, NUMBER_AT_PEG, 90),
            issue(1.1, 1.2, 15.0, 60),
            issue(1.2, 1.3, 30.0, 45),
            issue(1.3, 1.4, 60.0, 30),
            issue(1.4, 1.5, 120.0, 15),
            issue(1.5, TOP_TIER_MAX_RATE, 240.0, 10),
        ];
        let contraction = vec![
            contract(0.9, 1.0, 25.0),
            contract(0.8, 0.9, 50.0),
            contract(0.7, 0.8, 75.0),
            contract(0.6, 0.7, 100.0),
            contract(0.0, 0.6, 100.0),
        ];
        Self {
            issuance: RuleTable { tiers: sorted(issuance) },
            contraction: RuleTable { tiers: sorted(contraction) },
        }
    }
}

fn sorted<T: RateBand>(mut tiers: Vec<T>) -> Vec<T> {
    tiers.sort_by(|a, b| a.min().total_cmp(&b.min()));
    tiers
}
