// Port Layer - Interfaces for external collaborators

pub mod action_signer;
pub mod ledger_client;
pub mod rate_provider;
pub mod time_provider;

// Re-exports
pub use action_signer::ActionSigner;
pub use ledger_client::LedgerClient;
pub use rate_provider::{FixedRateProvider, RateProvider};
pub use time_provider::{SystemTimeProvider, TimeProvider};
