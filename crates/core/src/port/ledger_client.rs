// Ledger Client Port
// reason: async-trait required for dyn-compatible async methods
use crate::domain::{SignedAction, SupplySnapshot};
use crate::error::Result;
use async_trait::async_trait;

/// Read/write access to the ledger node
///
/// Implementations make exactly one remote call per method invocation and
/// never retry.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Read the current coin and bond supply
    ///
    /// # Errors
    /// - `AgentError::Transport` if the node is unreachable
    /// - `AgentError::Decode` if the body is not the expected shape
    /// - `AgentError::Rpc` if the node reports an error
    async fn fetch_supply(&self) -> Result<SupplySnapshot>;

    /// Submit a signed action, returning the transaction hash
    async fn submit_action(&self, action: &SignedAction) -> Result<String>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AgentError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    /// Mock LedgerClient that serves a fixed snapshot and records submissions
    pub struct MockLedgerClient {
        supply: Mutex<SupplySnapshot>,
        fail_fetch: Mutex<Option<String>>,
        reject_submit: Mutex<Option<(i64, String)>>,
        submitted: Mutex<Vec<SignedAction>>,
        fetch_count: AtomicUsize,
        submit_gate: Mutex<Option<Arc<Notify>>>,
        submit_entered: Notify,
    }

    impl MockLedgerClient {
        pub fn new(coins: f64, bonds: f64) -> Self {
            Self {
                supply: Mutex::new(SupplySnapshot::new(coins, bonds)),
                fail_fetch: Mutex::new(None),
                reject_submit: Mutex::new(None),
                submitted: Mutex::new(Vec::new()),
                fetch_count: AtomicUsize::new(0),
                submit_gate: Mutex::new(None),
                submit_entered: Notify::new(),
            }
        }

        pub fn set_supply(&self, coins: f64, bonds: f64) {
            *self.supply.lock().unwrap() = SupplySnapshot::new(coins, bonds);
        }

        /// Make every fetch fail with a transport error
        pub fn fail_fetch(&self, message: impl Into<String>) {
            *self.fail_fetch.lock().unwrap() = Some(message.into());
        }

        /// Make every submission fail with a server-reported error
        pub fn reject_submit(&self, code: i64, message: impl Into<String>) {
            *self.reject_submit.lock().unwrap() = Some((code, message.into()));
        }

        pub fn submitted(&self) -> Vec<SignedAction> {
            self.submitted.lock().unwrap().clone()
        }

        pub fn fetch_count(&self) -> usize {
            self.fetch_count.load(Ordering::SeqCst)
        }

        /// Hold every submission until the returned gate is notified
        pub fn gate_submissions(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            *self.submit_gate.lock().unwrap() = Some(Arc::clone(&gate));
            gate
        }

        /// Resolves once a submission has started
        pub async fn submission_started(&self) {
            self.submit_entered.notified().await;
        }
    }

    #[async_trait]
    impl LedgerClient for MockLedgerClient {
        async fn fetch_supply(&self) -> Result<SupplySnapshot> {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = self.fail_fetch.lock().unwrap().clone() {
                return Err(AgentError::Transport(message));
            }
            Ok(*self.supply.lock().unwrap())
        }

        async fn submit_action(&self, action: &SignedAction) -> Result<String> {
            let gate = self.submit_gate.lock().unwrap().clone();
            self.submit_entered.notify_one();
            if let Some(gate) = gate {
                gate.notified().await;
            }

            if let Some((code, message)) = self.reject_submit.lock().unwrap().clone() {
                return Err(AgentError::Rpc { code, message });
            }
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(action.clone());
            Ok(format!("tx-{}", submitted.len()))
        }
    }
}
