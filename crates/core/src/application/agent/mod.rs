// Policy Agent - one observe/decide/sign/submit cycle

pub mod constants;
mod scheduler_loop;
mod shutdown;

pub use scheduler_loop::{LoopStats, SchedulerLoop};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::engine::StabilizationEngine;
use crate::domain::{Decision, Direction, SignedAction, UnsignedAction};
use crate::error::AgentError;
use crate::port::{ActionSigner, LedgerClient, RateProvider};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Stage of a cycle, reported with failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Fetching,
    Deciding,
    Signing,
    Submitting,
}

impl CyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Fetching => "fetching",
            CyclePhase::Deciding => "deciding",
            CyclePhase::Signing => "signing",
            CyclePhase::Submitting => "submitting",
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cycle abandoned at `phase`
#[derive(Error, Debug)]
#[error("{phase} failed: {error}")]
pub struct CycleFailure {
    pub phase: CyclePhase,
    #[source]
    pub error: AgentError,
}

impl CycleFailure {
    fn at(phase: CyclePhase) -> impl FnOnce(AgentError) -> Self {
        move |error| Self { phase, error }
    }
}

/// Result of a completed cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Nothing submitted: outstanding bonds cover the demand gap
    NoOp { demand_gap: f64, bonds: f64 },
    /// Action accepted by the ledger node
    Submitted { tx_hash: String, action: SignedAction },
}

/// The agent: engine plus the collaborators a cycle talks to
pub struct PolicyAgent {
    engine: StabilizationEngine,
    ledger: Arc<dyn LedgerClient>,
    rates: Arc<dyn RateProvider>,
    signer: Arc<dyn ActionSigner>,
    eligible_agent_ids: Vec<String>,
}

impl PolicyAgent {
    /// Create an agent
    ///
    /// # Arguments
    /// * `engine` - Stabilization engine bound to the rule tables
    /// * `ledger` - Ledger node client (supply reads, action writes)
    /// * `rates` - Exchange rate source
    /// * `signer` - Signs actions as this agent
    /// * `eligible_agent_ids` - Agents entitled to the issued coins/bonds
    pub fn new(
        engine: StabilizationEngine,
        ledger: Arc<dyn LedgerClient>,
        rates: Arc<dyn RateProvider>,
        signer: Arc<dyn ActionSigner>,
        eligible_agent_ids: Vec<String>,
    ) -> Self {
        Self {
            engine,
            ledger,
            rates,
            signer,
            eligible_agent_ids,
        }
    }

    pub fn agent_id(&self) -> &str {
        self.signer.agent_id()
    }

    /// Run one cycle: snapshot -> decide -> sign -> submit
    ///
    /// Makes at most one supply read and, unless the decision is a no-op,
    /// exactly one submission. Nothing is retried.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleFailure> {
        debug!(phase = %CyclePhase::Fetching, "Reading supply");
        let supply = self
            .ledger
            .fetch_supply()
            .await
            .map_err(CycleFailure::at(CyclePhase::Fetching))?;
        let rate = self
            .rates
            .exchange_rate()
            .await
            .map_err(CycleFailure::at(CyclePhase::Fetching))?;

        info!(
            coins = %supply.coins,
            bonds = %supply.bonds,
            rate = %rate,
            "Observed ledger supply"
        );

        let decision = self
            .engine
            .decide(&supply, rate)
            .map_err(|e| CycleFailure::at(CyclePhase::Deciding)(e.into()))?;

        let adjustment = match decision {
            Decision::NoOp { demand_gap, bonds } => {
                info!(
                    demand_gap = %demand_gap,
                    bonds = %bonds,
                    "Outstanding bonds absorb demand, nothing to submit"
                );
                return Ok(CycleOutcome::NoOp { demand_gap, bonds });
            }
            Decision::Act(adjustment) => adjustment,
        };

        info!(
            direction = adjustment.direction.as_str(),
            num_of_coins = %adjustment.num_of_coins,
            num_of_bonds = %adjustment.num_of_bonds,
            tax = %adjustment.tax,
            "Policy decided"
        );

        let unsigned = UnsignedAction::new(
            self.signer.agent_id(),
            self.eligible_agent_ids.clone(),
            &adjustment,
        );
        let action = self
            .signer
            .sign(unsigned)
            .map_err(CycleFailure::at(CyclePhase::Signing))?;

        let tx_hash = self
            .ledger
            .submit_action(&action)
            .await
            .map_err(CycleFailure::at(CyclePhase::Submitting))?;

        info!(
            tx_hash = %tx_hash,
            contraction = adjustment.direction == Direction::Contraction,
            "Action submitted"
        );

        Ok(CycleOutcome::Submitted { tx_hash, action })
    }
}
