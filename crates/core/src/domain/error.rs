// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    #[error("No issuance tier covers exchange rate {rate}")]
    NoIssuanceTier { rate: f64 },

    #[error("No contraction tier covers exchange rate {rate}")]
    NoContractionTier { rate: f64 },

    #[error("Invalid exchange rate: {0}")]
    InvalidRate(f64),

    #[error("Invalid supply snapshot: coins={coins}, bonds={bonds}")]
    InvalidSupply { coins: f64, bonds: f64 },

    #[error("Invalid rule table: {0}")]
    InvalidTable(String),
}

pub type Result<T> = std::result::Result<T, DecisionError>;
