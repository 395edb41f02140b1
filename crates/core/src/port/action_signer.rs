// Action Signer Port
use crate::domain::{SignedAction, UnsignedAction};
use crate::error::Result;

/// Signs actions on behalf of one agent identity
///
/// Implementations sign [`UnsignedAction::canonical_bytes`] and return the
/// action frozen with its base64 detached signature.
pub trait ActionSigner: Send + Sync {
    /// Public identity the signatures verify against
    fn agent_id(&self) -> &str;

    /// # Errors
    /// - `AgentError::Signing` if the key material is unusable
    fn sign(&self, action: UnsignedAction) -> Result<SignedAction>;
}

pub mod mocks {
    use super::*;
    use crate::error::AgentError;

    /// Signer producing a fixed marker signature
    pub struct MockActionSigner {
        agent_id: String,
        broken: bool,
    }

    impl MockActionSigner {
        pub fn new(agent_id: impl Into<String>) -> Self {
            Self {
                agent_id: agent_id.into(),
                broken: false,
            }
        }

        /// Signer whose key material is unusable
        pub fn broken(agent_id: impl Into<String>) -> Self {
            Self {
                agent_id: agent_id.into(),
                broken: true,
            }
        }
    }

    impl ActionSigner for MockActionSigner {
        fn agent_id(&self) -> &str {
            &self.agent_id
        }

        fn sign(&self, action: UnsignedAction) -> Result<SignedAction> {
            if self.broken {
                return Err(AgentError::Signing("mock key unusable".to_string()));
            }
            let sig = format!("mock-sig-{}", action.canonical_bytes()?.len());
            Ok(action.into_signed(sig))
        }
    }
}
