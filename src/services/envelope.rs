//! Envelope service
//!
//! Encrypts a message for every member of a pact and decrypts messages
//! addressed to the caller. Ciphertext travels as standard base64 text.

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::debug;

use super::keys::KeyManager;
use crate::config::Configuration;
use crate::crypto::{CryptoEngine, PublicKey};
use crate::error::{PactError, PactResult};

/// Encrypt and decrypt on behalf of the caller's keypair
pub struct EnvelopeService<'a, E: CryptoEngine> {
    config: &'a Configuration,
    engine: &'a E,
}

impl<'a, E: CryptoEngine> EnvelopeService<'a, E> {
    pub fn new(config: &'a Configuration, engine: &'a E) -> Self {
        Self { config, engine }
    }

    /// Encrypt `plaintext` for every member of `pact`
    ///
    /// The pact must exist and have at least one member, and every member
    /// must be a well-formed public key.
    pub fn encrypt_for(&self, pact: &str, plaintext: &[u8]) -> PactResult<String> {
        let members = self
            .config
            .pacts
            .get(pact)
            .filter(|members| !members.is_empty())
            .ok_or_else(|| PactError::UnknownPact(pact.to_string()))?;

        let recipients = members
            .iter()
            .enumerate()
            .map(|(index, member)| {
                PublicKey::from_base64(member).map_err(|e| match e {
                    PactError::InvalidKey(reason) => PactError::InvalidKey(format!(
                        "member {} of pact '{}': {}",
                        index, pact, reason
                    )),
                    other => other,
                })
            })
            .collect::<PactResult<Vec<_>>>()?;

        let sender = self.keys().load_keypair()?;
        let envelope = self.engine.seal(plaintext, &recipients, &sender)?;

        debug!(pact, recipients = recipients.len(), "sealed message");
        Ok(STANDARD.encode(envelope))
    }

    /// Decrypt base64 ciphertext with the caller's keypair
    pub fn decrypt(&self, ciphertext: &str) -> PactResult<Vec<u8>> {
        let envelope = STANDARD
            .decode(ciphertext.trim())
            .map_err(|e| PactError::Encoding(format!("ciphertext is not valid base64: {}", e)))?;

        let recipient = self.keys().load_keypair()?;
        self.engine.open(&envelope, &recipient)
    }

    fn keys(&self) -> KeyManager<'a, E> {
        KeyManager::new(self.config, self.engine)
    }
}
