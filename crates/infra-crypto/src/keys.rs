//! Agent key management
//!
//! Keys travel as standard base64. A private key may be a 32-byte seed or
//! the 64-byte `seed || public key` form used by most ed25519 tooling.

use crate::{CryptoError, CryptoResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{
    Signature, SigningKey, Verifier, VerifyingKey, KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH,
    SECRET_KEY_LENGTH, SIGNATURE_LENGTH,
};
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroize;

/// The agent's signing identity
#[derive(Clone)]
pub struct AgentKeyPair {
    signing_key: SigningKey,
}

impl AgentKeyPair {
    /// Generate a new random key pair (OS CSPRNG)
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Load from a base64 seed or keypair
    ///
    /// Decoded buffers are zeroized before returning.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let mut bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
            CryptoError::InvalidKeyFormat(format!("private key is not base64: {}", e))
        })?;

        let key = match bytes.len() {
            SECRET_KEY_LENGTH => {
                let mut seed = [0u8; SECRET_KEY_LENGTH];
                seed.copy_from_slice(&bytes);
                let key = Self::from_seed(&seed);
                seed.zeroize();
                Ok(key)
            }
            KEYPAIR_LENGTH => {
                let mut keypair = [0u8; KEYPAIR_LENGTH];
                keypair.copy_from_slice(&bytes);
                let key = SigningKey::from_keypair_bytes(&keypair)
                    .map(|signing_key| Self { signing_key })
                    .map_err(|e| {
                        CryptoError::InvalidKeyFormat(format!("inconsistent keypair: {}", e))
                    });
                keypair.zeroize();
                key
            }
            n => Err(CryptoError::InvalidKeyFormat(format!(
                "private key must be {} or {} bytes, got {}",
                SECRET_KEY_LENGTH, KEYPAIR_LENGTH, n
            ))),
        };

        bytes.zeroize();
        key
    }

    pub fn public_key(&self) -> AgentPublicKey {
        AgentPublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Agent id: base64 of the 32-byte public key
    pub fn public_key_base64(&self) -> String {
        self.public_key().to_base64()
    }

    /// 64-byte keypair as base64 (for secure storage only!)
    pub fn keypair_base64(&self) -> String {
        let mut bytes = self.signing_key.to_keypair_bytes();
        let encoded = STANDARD.encode(bytes);
        bytes.zeroize();
        encoded
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for AgentKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentKeyPair")
            .field("public_key", &self.public_key_base64())
            .finish_non_exhaustive()
    }
}

/// Public key used to verify an agent's signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPublicKey {
    verifying_key: VerifyingKey,
}

impl AgentPublicKey {
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
            CryptoError::InvalidKeyFormat(format!("public key is not base64: {}", e))
        })?;

        let key_bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidKeyFormat(format!(
                "public key must be {} bytes, got {}",
                PUBLIC_KEY_LENGTH,
                bytes.len()
            ))
        })?;

        let verifying_key = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| CryptoError::InvalidKeyFormat(e.to_string()))?;
        Ok(Self { verifying_key })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.verifying_key.as_bytes())
    }

    /// Verify a base64 detached signature over `message`
    pub fn verify(&self, message: &[u8], signature_base64: &str) -> CryptoResult<()> {
        let bytes = STANDARD.decode(signature_base64.trim()).map_err(|e| {
            CryptoError::VerificationFailed(format!("signature is not base64: {}", e))
        })?;

        let sig_bytes: [u8; SIGNATURE_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::VerificationFailed(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LENGTH,
                bytes.len()
            ))
        })?;

        self.verifying_key
            .verify(message, &Signature::from_bytes(&sig_bytes))
            .map_err(|_| CryptoError::VerificationFailed("signature does not match".into()))
    }
}
