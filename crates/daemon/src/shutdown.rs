// Bounded wait for the scheduler loop after a shutdown request

use stabilizer_core::application::LoopStats;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How the scheduler loop ended once shutdown was requested
#[derive(Debug)]
pub enum LoopExit {
    /// Loop observed the token and returned its counters
    Finished(LoopStats),
    /// Loop task panicked or was cancelled
    Failed(String),
    /// A cycle was still in flight when the grace period ran out
    GraceElapsed,
}

/// Wait up to `grace` for the loop task; the in-flight cycle is never cancelled
pub async fn wait_for_loop(handle: JoinHandle<LoopStats>, grace: Duration) -> LoopExit {
    match tokio::time::timeout(grace, handle).await {
        Ok(Ok(stats)) => {
            info!(
                cycles = stats.cycles,
                submissions = stats.submissions,
                failures = stats.failures,
                "Shutdown complete."
            );
            LoopExit::Finished(stats)
        }
        Ok(Err(e)) => {
            error!(error = ?e, "Scheduler loop failed");
            LoopExit::Failed(e.to_string())
        }
        Err(_) => {
            warn!(
                grace_secs = grace.as_secs_f64(),
                "Grace period elapsed with a cycle still in flight. Exiting."
            );
            LoopExit::GraceElapsed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loop_finishing_within_grace() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            LoopStats {
                cycles: 3,
                submissions: 2,
                ..LoopStats::default()
            }
        });

        match wait_for_loop(handle, Duration::from_secs(2)).await {
            LoopExit::Finished(stats) => {
                assert_eq!(stats.cycles, 3);
                assert_eq!(stats.submissions, 2);
            }
            other => panic!("expected loop to finish, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_grace_elapses_while_cycle_in_flight() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            LoopStats::default()
        });

        let started = tokio::time::Instant::now();
        let exit = wait_for_loop(handle, Duration::from_millis(50)).await;

        assert!(matches!(exit, LoopExit::GraceElapsed));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_panicked_loop_reports_failure() {
        let handle = tokio::spawn(async {
            if true {
                panic!("loop crashed");
            }
            LoopStats::default()
        });

        let exit = wait_for_loop(handle, Duration::from_secs(2)).await;
        assert!(matches!(exit, LoopExit::Failed(_)));
    }
}
