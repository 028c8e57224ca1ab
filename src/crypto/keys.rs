//! Key types for the cryptographic engine
//!
//! Keys are 32-byte X25519 values. Their text form, used in key files, pact
//! member lists and `key-export` output, is standard base64.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{PactError, PactResult};

/// Size of a public or secret key in bytes
pub const KEY_SIZE: usize = 32;

/// A public key that messages can be sealed for
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; KEY_SIZE]);

impl PublicKey {
    /// Wrap raw key bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Encode as base64 text
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Decode from base64 text, ignoring surrounding whitespace
    pub fn from_base64(encoded: &str) -> PactResult<Self> {
        let bytes = decode_key(encoded, "public key")?;
        Ok(Self(*bytes))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_base64()).finish()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// A secret key, zeroed when dropped
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_SIZE]);

impl SecretKey {
    /// Wrap raw key bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Encode as base64 text
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(STANDARD.encode(self.0))
    }

    /// Decode from base64 text, ignoring surrounding whitespace
    pub fn from_base64(encoded: &str) -> PactResult<Self> {
        let bytes = decode_key(encoded, "private key")?;
        Ok(Self(*bytes))
    }
}

// Don't print the key material in Debug output
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// A public/private keypair
#[derive(Debug, Clone)]
pub struct Keypair {
    public: PublicKey,
    secret: SecretKey,
}

impl Keypair {
    pub fn new(public: PublicKey, secret: SecretKey) -> Self {
        Self { public, secret }
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

fn decode_key(encoded: &str, what: &str) -> PactResult<Zeroizing<[u8; KEY_SIZE]>> {
    let decoded = Zeroizing::new(
        STANDARD
            .decode(encoded.trim())
            .map_err(|e| PactError::InvalidKey(format!("{} is not valid base64: {}", what, e)))?,
    );

    if decoded.len() != KEY_SIZE {
        return Err(PactError::InvalidKey(format!(
            "{} must be {} bytes, got {}",
            what,
            KEY_SIZE,
            decoded.len()
        )));
    }

    let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);
    bytes.copy_from_slice(&decoded);
    Ok(bytes)
}
