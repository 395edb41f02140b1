// Agent constants (no magic values)
use std::time::Duration;

/// Default pause between policy cycles (10 minutes)
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(600);

/// Upper bound on a single ledger RPC call (60s)
/// Caps the worst-case time one cycle can block the loop
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(60);

/// Time the process waits for an in-flight cycle after a shutdown signal (2s)
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Exchange rate served by the fixed rate provider when none is configured
pub const DEFAULT_EXCHANGE_RATE: f64 = 1.25;
