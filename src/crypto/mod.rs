//! Cryptographic engine for pact
//!
//! The rest of the crate only talks to [`CryptoEngine`]: it hands over key
//! material and bytes, and gets bytes back. [`SealedEnvelopeEngine`] is the
//! engine the binary uses.

pub mod envelope;
pub mod keys;

pub use envelope::SealedEnvelopeEngine;
pub use keys::{Keypair, PublicKey, SecretKey, KEY_SIZE};

use crate::error::PactResult;

/// Key generation and multi-recipient encryption
pub trait CryptoEngine {
    /// Create a new random keypair
    fn generate_keypair(&self) -> PactResult<Keypair>;

    /// Encrypt `plaintext` so that every holder of a secret key matching one
    /// of `recipients` can read it
    fn seal(&self, plaintext: &[u8], recipients: &[PublicKey], sender: &Keypair)
        -> PactResult<Vec<u8>>;

    /// Decrypt an envelope addressed to `recipient`
    ///
    /// Fails with [`crate::PactError::Decryption`] when the envelope is not
    /// addressed to this keypair, is corrupted, or was tampered with.
    fn open(&self, envelope: &[u8], recipient: &Keypair) -> PactResult<Vec<u8>>;
}
