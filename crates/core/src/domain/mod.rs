// Domain Layer - Pure policy model

pub mod action;
pub mod error;
pub mod rule_table;
pub mod supply;

// Re-exports
pub use action::{Decision, Direction, PolicyAdjustment, SignedAction, UnsignedAction};
pub use error::DecisionError;
pub use rule_table::{
    ContractionTier, IssuanceTier, RateBand, RuleTable, RuleTables, RuleTablesDocument,
    AVERAGE_BLOCK_INTERVAL_SECS, NUMBER_AT_PEG,
};
pub use supply::{SupplySnapshot, BOND_QUANTITY_KEY, COIN_QUANTITY_KEY};
