//! Stabilizer Crypto - Ed25519 signing of policy actions
//!
//! This crate provides:
//! - Agent key loading from base64 (32-byte seed or 64-byte keypair)
//! - The `ActionSigner` adapter used by the agent cycle
//! - Detached signature verification of submitted actions
//!
//! Private key bytes are never logged and decoded buffers are zeroized.

pub mod keys;
pub mod signer;

pub use keys::{AgentKeyPair, AgentPublicKey};
pub use signer::{verify_action, Ed25519ActionSigner};

use stabilizer_core::AgentError;
use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error(
        "Key mismatch: configured agent id {configured} does not match private key ({derived})"
    )]
    KeyMismatch { configured: String, derived: String },

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Verification failed: {0}")]
    VerificationFailed(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;

impl From<CryptoError> for AgentError {
    fn from(err: CryptoError) -> Self {
        AgentError::Signing(err.to_string())
    }
}
