// Ed25519 ActionSigner adapter
use crate::keys::{AgentKeyPair, AgentPublicKey};
use crate::{CryptoError, CryptoResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::Signer;
use stabilizer_core::domain::{SignedAction, UnsignedAction};
use stabilizer_core::port::ActionSigner;
use stabilizer_core::Result;
use tracing::debug;

/// Signs canonical action bytes with the agent's ed25519 key
pub struct Ed25519ActionSigner {
    keypair: AgentKeyPair,
    agent_id: String,
}

impl Ed25519ActionSigner {
    /// Signer whose agent id is the key's own public key
    pub fn new(keypair: AgentKeyPair) -> Self {
        let agent_id = keypair.public_key_base64();
        Self { keypair, agent_id }
    }

    /// Signer for a configured agent id, which must be the key's public key
    pub fn with_agent_id(keypair: AgentKeyPair, agent_id: &str) -> CryptoResult<Self> {
        let derived = keypair.public_key_base64();
        if derived != agent_id.trim() {
            return Err(CryptoError::KeyMismatch {
                configured: agent_id.to_string(),
                derived,
            });
        }
        Ok(Self::new(keypair))
    }

    /// Sign raw bytes, returning the base64 detached signature
    pub fn sign_bytes(&self, message: &[u8]) -> CryptoResult<String> {
        let signature = self
            .keypair
            .signing_key()
            .try_sign(message)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(STANDARD.encode(signature.to_bytes()))
    }
}

impl ActionSigner for Ed25519ActionSigner {
    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    fn sign(&self, action: UnsignedAction) -> Result<SignedAction> {
        let message = action.canonical_bytes()?;
        let agent_sig = self.sign_bytes(&message)?;
        debug!(bytes = message.len(), "Signed action");
        Ok(action.into_signed(agent_sig))
    }
}

/// Verify a signed action against `public_key`
///
/// Recomputes the canonical bytes, so any change to a signed field after
/// signing fails verification.
pub fn verify_action(action: &SignedAction, public_key: &AgentPublicKey) -> CryptoResult<()> {
    let message = action
        .action()
        .canonical_bytes()
        .map_err(|e| CryptoError::VerificationFailed(e.to_string()))?;
    public_key.verify(&message, action.agent_sig())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stabilizer_core::domain::{Direction, PolicyAdjustment};

    fn unsigned(agent_id: &str) -> UnsignedAction {
        UnsignedAction::new(
            agent_id,
            vec![agent_id.to_string()],
            &PolicyAdjustment {
                direction: Direction::Expansion,
                num_of_coins: 30.0,
                num_of_bonds: 0.0,
                tax: 0.0,
            },
        )
    }

    fn signer() -> Ed25519ActionSigner {
        Ed25519ActionSigner::new(AgentKeyPair::from_seed(&[42u8; 32]))
    }

    #[test]
    fn test_sign_then_verify() {
        let signer = signer();
        let action = signer.sign(unsigned(signer.agent_id())).unwrap();
        let public_key = AgentPublicKey::from_base64(signer.agent_id()).unwrap();

        assert!(verify_action(&action, &public_key).is_ok());
    }

    #[test]
    fn test_signature_is_deterministic() {
        let signer = signer();
        let first = signer.sign(unsigned(signer.agent_id())).unwrap();
        let second = signer.sign(unsigned(signer.agent_id())).unwrap();
        assert_eq!(first.agent_sig(), second.agent_sig());
        assert_eq!(STANDARD.decode(first.agent_sig()).unwrap().len(), 64);
    }

    #[test]
    fn test_mutating_any_signed_field_fails_verification() {
        let signer = signer();
        let public_key = AgentPublicKey::from_base64(signer.agent_id()).unwrap();
        let signed = signer.sign(unsigned(signer.agent_id())).unwrap();

        let mutations: Vec<Box<dyn Fn(&mut UnsignedAction)>> = vec![
            Box::new(|a| a.agent_id = "someone-else".to_string()),
            Box::new(|a| a.eligible_agent_ids.push("intruder".to_string())),
            Box::new(|a| a.num_of_coins = 31.0),
            Box::new(|a| a.num_of_bonds = 0.5),
            Box::new(|a| a.tax = 1.0),
        ];

        for mutate in mutations {
            let (mut action, sig) = signed.clone().into_parts();
            mutate(&mut action);
            let tampered = action.into_signed(sig);
            assert!(matches!(
                verify_action(&tampered, &public_key),
                Err(CryptoError::VerificationFailed(_))
            ));
        }
    }

    #[test]
    fn test_wrong_key_fails_verification() {
        let signer = signer();
        let signed = signer.sign(unsigned(signer.agent_id())).unwrap();
        let other = AgentKeyPair::from_seed(&[1u8; 32]).public_key();

        assert!(verify_action(&signed, &other).is_err());
    }

    #[test]
    fn test_signed_payload_verifies_after_wire_round_trip() {
        let signer = signer();
        let signed = signer.sign(unsigned(signer.agent_id())).unwrap();
        let wire = serde_json::to_string(&signed).unwrap();
        let received: SignedAction = serde_json::from_str(&wire).unwrap();
        let public_key = AgentPublicKey::from_base64(signer.agent_id()).unwrap();

        assert!(verify_action(&received, &public_key).is_ok());
    }

    #[test]
    fn test_agent_id_must_match_key() {
        let keypair = AgentKeyPair::from_seed(&[42u8; 32]);
        let other = AgentKeyPair::from_seed(&[43u8; 32]).public_key_base64();

        let own = keypair.public_key_base64();
        assert!(Ed25519ActionSigner::with_agent_id(keypair.clone(), &own).is_ok());
        assert!(matches!(
            Ed25519ActionSigner::with_agent_id(keypair, &other),
            Err(CryptoError::KeyMismatch { .. })
        ));
    }
}
