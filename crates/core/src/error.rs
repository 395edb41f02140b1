// Central Error Type for the Agent

use thiserror::Error;

/// Agent-level error type
///
/// Every variant is recoverable at the scheduler loop boundary: the cycle
/// is abandoned and the loop sleeps until the next interval.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("RPC error ({code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("Decision error: {0}")]
    Decision(#[from] crate::domain::DecisionError),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Whether a bounded retry could help
    ///
    /// Only transport faults are transient. Server-reported and decision
    /// errors reflect ledger or table state and will repeat.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::Transport(_))
    }

    /// Short classification used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Transport(_) => "transport",
            AgentError::Decode(_) => "decode",
            AgentError::Rpc { .. } => "rpc",
            AgentError::Decision(_) => "decision",
            AgentError::Signing(_) => "signing",
            AgentError::RateUnavailable(_) => "rate",
            AgentError::Config(_) => "config",
        }
    }
}

/// Result type alias using AgentError
pub type Result<T> = std::result::Result<T, AgentError>;

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Decode(err.to_string())
    }
}
