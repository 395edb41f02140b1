// Application Layer - Policy decision and the agent cycle

pub mod agent;
pub mod engine;

// Re-exports
pub use agent::{
    shutdown_channel, CycleFailure, CycleOutcome, CyclePhase, LoopStats, PolicyAgent,
    SchedulerLoop, ShutdownSender, ShutdownToken,
};
pub use engine::StabilizationEngine;
