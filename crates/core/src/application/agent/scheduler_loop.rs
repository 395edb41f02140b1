// Scheduler Loop - drives policy cycles on a fixed interval
//
// Idle -> Fetching -> Deciding -> Signing -> Submitting -> Sleeping -> Idle
//
// Exactly one cycle runs at a time. A cycle failure is logged and the loop
// goes straight to sleeping. Shutdown is only observed between cycles and
// while sleeping; an in-flight cycle is never abandoned.

use super::{CycleOutcome, PolicyAgent, ShutdownToken};
use crate::port::TimeProvider;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{error, info, info_span, warn, Instrument};

/// Counters kept across the life of the loop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopStats {
    pub cycles: u64,
    pub submissions: u64,
    pub no_ops: u64,
    pub failures: u64,
    pub last_submission_at: Option<DateTime<Utc>>,
}

pub struct SchedulerLoop {
    agent: PolicyAgent,
    interval: Duration,
    clock: Arc<dyn TimeProvider>,
}

impl SchedulerLoop {
    /// Create a loop running `agent` every `interval`
    ///
    /// `clock` timestamps submissions in [`LoopStats`].
    pub fn new(agent: PolicyAgent, interval: Duration, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            agent,
            interval,
            clock,
        }
    }

    /// Run until shutdown is requested
    pub async fn run(&self, mut shutdown: ShutdownToken) -> LoopStats {
        let mut stats = LoopStats::default();
        info!(
            agent_id = %self.agent.agent_id(),
            interval_secs = self.interval.as_secs_f64(),
            "Scheduler loop started"
        );

        loop {
            if shutdown.is_shutdown() {
                info!("Scheduler loop shutting down");
                break;
            }

            self.run_once(&mut stats).await;

            tokio::select! {
                _ = sleep(self.interval) => {},
                _ = shutdown.wait() => {
                    info!("Scheduler loop interrupted while sleeping");
                    break;
                }
            }
        }

        info!(
            cycles = stats.cycles,
            submissions = stats.submissions,
            no_ops = stats.no_ops,
            failures = stats.failures,
            "Scheduler loop stopped"
        );
        stats
    }

    /// Run a single cycle and fold its outcome into `stats`
    pub async fn run_once(&self, stats: &mut LoopStats) {
        let cycle_id = uuid::Uuid::new_v4();
        let span = info_span!("cycle", cycle_id = %cycle_id);
        let started = Instant::now();

        let result = self.agent.run_cycle().instrument(span.clone()).await;
        stats.cycles += 1;

        let _entered = span.enter();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(CycleOutcome::Submitted { tx_hash, .. }) => {
                stats.submissions += 1;
                stats.last_submission_at = Some(self.clock.now());
                info!(tx_hash = %tx_hash, elapsed_ms, "Cycle completed");
            }
            Ok(CycleOutcome::NoOp { .. }) => {
                stats.no_ops += 1;
                info!(elapsed_ms, "Cycle completed without action");
            }
            Err(failure) => {
                stats.failures += 1;
                if failure.error.is_retryable() {
                    warn!(
                        phase = %failure.phase,
                        kind = failure.error.kind(),
                        error = %failure.error,
                        elapsed_ms,
                        "Cycle abandoned on transient fault"
                    );
                } else {
                    error!(
                        phase = %failure.phase,
                        kind = failure.error.kind(),
                        error = %failure.error,
                        elapsed_ms,
                        "Cycle abandoned"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::agent::shutdown_channel;
    use crate::application::engine::StabilizationEngine;
    use crate::domain::RuleTables;
    use crate::port::action_signer::mocks::MockActionSigner;
    use crate::port::ledger_client::mocks::MockLedgerClient;
    use crate::port::rate_provider::mocks::MockRateProvider;
    use crate::port::time_provider::mocks::FixedTimeProvider;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn scheduler_with_clock(
        ledger: Arc<MockLedgerClient>,
        rates: Arc<MockRateProvider>,
        interval: Duration,
        clock: Arc<FixedTimeProvider>,
    ) -> SchedulerLoop {
        let agent = PolicyAgent::new(
            StabilizationEngine::new(Arc::new(RuleTables::default())),
            ledger,
            rates,
            Arc::new(MockActionSigner::new("agent")),
            vec!["agent".to_string()],
        );
        SchedulerLoop::new(agent, interval, clock)
    }

    fn scheduler(
        ledger: Arc<MockLedgerClient>,
        rates: Arc<MockRateProvider>,
        interval: Duration,
    ) -> SchedulerLoop {
        let clock = Arc::new(FixedTimeProvider::new(at(1_700_000_000)));
        scheduler_with_clock(ledger, rates, interval, clock)
    }

    #[tokio::test]
    async fn test_run_once_counts_outcomes() {
        let ledger = Arc::new(MockLedgerClient::new(100.0, 0.0));
        let rates = Arc::new(MockRateProvider::new(1.25));
        let clock = Arc::new(FixedTimeProvider::new(at(1_700_000_000)));
        let scheduler = scheduler_with_clock(
            ledger.clone(),
            rates.clone(),
            Duration::from_secs(600),
            clock.clone(),
        );
        let mut stats = LoopStats::default();

        scheduler.run_once(&mut stats).await;
        assert_eq!(stats.last_submission_at, Some(at(1_700_000_000)));

        clock.set(at(1_700_000_600));
        ledger.set_supply(100.0, 50.0);
        scheduler.run_once(&mut stats).await;
        rates.set_rate(5_000_000.0);
        scheduler.run_once(&mut stats).await;

        assert_eq!(stats.cycles, 3);
        assert_eq!(stats.submissions, 1);
        assert_eq!(stats.no_ops, 1);
        assert_eq!(stats.failures, 1);
        // no-op and failed cycles leave the last submission time alone
        assert_eq!(stats.last_submission_at, Some(at(1_700_000_000)));
    }

    #[tokio::test]
    async fn test_submission_timestamp_follows_clock() {
        let ledger = Arc::new(MockLedgerClient::new(100.0, 0.0));
        let rates = Arc::new(MockRateProvider::new(1.25));
        let clock = Arc::new(FixedTimeProvider::new(at(1_000)));
        let scheduler =
            scheduler_with_clock(ledger, rates, Duration::from_secs(600), clock.clone());
        let mut stats = LoopStats::default();

        scheduler.run_once(&mut stats).await;
        clock.set(at(2_000));
        scheduler.run_once(&mut stats).await;

        assert_eq!(stats.submissions, 2);
        assert_eq!(stats.last_submission_at, Some(at(2_000)));
    }

    #[tokio::test]
    async fn test_errors_do_not_stop_loop() {
        let ledger = Arc::new(MockLedgerClient::new(100.0, 0.0));
        ledger.fail_fetch("node down");
        let rates = Arc::new(MockRateProvider::new(1.25));
        let scheduler = Arc::new(scheduler(ledger.clone(), rates, Duration::from_millis(5)));
        let (shutdown_tx, shutdown_rx) = shutdown_channel();

        let runner = Arc::clone(&scheduler);
        let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.shutdown();
        let stats = handle.await.unwrap();

        assert!(stats.cycles >= 2, "loop should keep cycling after failures");
        assert_eq!(stats.failures, stats.cycles);
        assert!(ledger.fetch_count() >= 2);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_sleep() {
        let ledger = Arc::new(MockLedgerClient::new(100.0, 0.0));
        let rates = Arc::new(MockRateProvider::new(1.25));
        let scheduler = Arc::new(scheduler(ledger.clone(), rates, Duration::from_secs(3600)));
        let (shutdown_tx, shutdown_rx) = shutdown_channel();

        let runner = Arc::clone(&scheduler);
        let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.shutdown();
        let stats = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loop should stop without waiting out the interval")
            .unwrap();

        assert_eq!(stats.cycles, 1);
        assert_eq!(ledger.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_mid_cycle_completes_submission() {
        let ledger = Arc::new(MockLedgerClient::new(100.0, 0.0));
        let gate = ledger.gate_submissions();
        let rates = Arc::new(MockRateProvider::new(1.25));
        let scheduler = scheduler(ledger.clone(), rates, Duration::from_secs(3600));
        let (shutdown_tx, shutdown_rx) = shutdown_channel();

        let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

        tokio::time::timeout(Duration::from_secs(1), ledger.submission_started())
            .await
            .expect("cycle should reach the submit call");
        shutdown_tx.shutdown();

        // the cycle is still held inside submit_action
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());
        assert!(ledger.submitted().is_empty());

        gate.notify_one();
        let stats = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loop should stop once the cycle finishes")
            .unwrap();

        assert_eq!(stats.cycles, 1);
        assert_eq!(stats.submissions, 1);
        assert_eq!(ledger.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_no_cycle_after_early_shutdown() {
        let ledger = Arc::new(MockLedgerClient::new(100.0, 0.0));
        let rates = Arc::new(MockRateProvider::new(1.25));
        let scheduler = scheduler(ledger.clone(), rates, Duration::from_secs(1));
        let (shutdown_tx, shutdown_rx) = shutdown_channel();

        shutdown_tx.shutdown();
        let stats = scheduler.run(shutdown_rx).await;

        assert_eq!(stats.cycles, 0);
        assert_eq!(ledger.fetch_count(), 0);
    }
}
