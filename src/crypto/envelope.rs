//! Multi-recipient sealed envelopes
//!
//! A fresh AES-256-GCM content key encrypts the message. The content key is
//! then wrapped once per recipient with a key derived from an X25519
//! exchange between the sender's secret key and the recipient's public key.
//!
//! ## Layout
//!
//! ```text
//! version (1) | sender public key (32) | recipient count (u16, BE)
//! count x [ nonce (12) | wrapped content key (48) ]
//! nonce (12) | ciphertext with tag
//! ```
//!
//! Recipients are not named in the envelope; a reader tries every slot.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

use super::keys::{Keypair, PublicKey, SecretKey, KEY_SIZE};
use super::CryptoEngine;
use crate::error::{PactError, PactResult};

/// Envelope format version
const VERSION: u8 = 1;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
const TAG_SIZE: usize = 16;

const HEADER_SIZE: usize = 1 + KEY_SIZE + 2;
const SLOT_SIZE: usize = NONCE_SIZE + KEY_SIZE + TAG_SIZE;

/// Domain separator for key-encryption-key derivation
const KEK_CONTEXT: &[u8] = b"pact envelope v1 key wrap";

/// The default engine: X25519 key agreement with AES-256-GCM
#[derive(Debug, Default, Clone, Copy)]
pub struct SealedEnvelopeEngine;

impl CryptoEngine for SealedEnvelopeEngine {
    fn generate_keypair(&self) -> PactResult<Keypair> {
        let mut secret_bytes = Zeroizing::new([0u8; KEY_SIZE]);
        OsRng.fill_bytes(&mut secret_bytes[..]);

        let secret = StaticSecret::from(*secret_bytes);
        let public = X25519PublicKey::from(&secret);

        Ok(Keypair::new(
            PublicKey::from_bytes(public.to_bytes()),
            SecretKey::from_bytes(secret.to_bytes()),
        ))
    }

    fn seal(
        &self,
        plaintext: &[u8],
        recipients: &[PublicKey],
        sender: &Keypair,
    ) -> PactResult<Vec<u8>> {
        if recipients.is_empty() {
            return Err(PactError::Encryption("no recipients given".to_string()));
        }
        let count = u16::try_from(recipients.len()).map_err(|_| {
            PactError::Encryption(format!("too many recipients: {}", recipients.len()))
        })?;

        let mut content_key = Zeroizing::new([0u8; KEY_SIZE]);
        OsRng.fill_bytes(&mut content_key[..]);

        let mut envelope = Vec::with_capacity(
            HEADER_SIZE + recipients.len() * SLOT_SIZE + NONCE_SIZE + plaintext.len() + TAG_SIZE,
        );
        envelope.push(VERSION);
        envelope.extend_from_slice(sender.public().as_bytes());
        envelope.extend_from_slice(&count.to_be_bytes());

        for recipient in recipients {
            let kek = key_encryption_key(sender.secret(), recipient);
            let (nonce, wrapped) = seal_with(&kek, &content_key[..])?;
            envelope.extend_from_slice(&nonce);
            envelope.extend_from_slice(&wrapped);
        }

        let (nonce, ciphertext) = seal_with(&content_key, plaintext)?;
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);

        Ok(envelope)
    }

    fn open(&self, envelope: &[u8], recipient: &Keypair) -> PactResult<Vec<u8>> {
        if envelope.len() < HEADER_SIZE {
            return Err(PactError::Decryption("envelope is truncated".to_string()));
        }

        if envelope[0] != VERSION {
            return Err(PactError::Decryption(format!(
                "unsupported envelope version: {}",
                envelope[0]
            )));
        }

        let mut sender_bytes = [0u8; KEY_SIZE];
        sender_bytes.copy_from_slice(&envelope[1..1 + KEY_SIZE]);
        let sender = PublicKey::from_bytes(sender_bytes);

        let count = u16::from_be_bytes([envelope[HEADER_SIZE - 2], envelope[HEADER_SIZE - 1]]);
        let slots_end = HEADER_SIZE + usize::from(count) * SLOT_SIZE;
        if envelope.len() < slots_end + NONCE_SIZE + TAG_SIZE {
            return Err(PactError::Decryption("envelope is truncated".to_string()));
        }

        let kek = key_encryption_key(recipient.secret(), &sender);
        let content_key = envelope[HEADER_SIZE..slots_end]
            .chunks_exact(SLOT_SIZE)
            .find_map(|slot| {
                let (nonce, wrapped) = slot.split_at(NONCE_SIZE);
                open_with(&kek, nonce, wrapped)
            })
            .map(Zeroizing::new)
            .filter(|key| key.len() == KEY_SIZE)
            .ok_or_else(|| {
                PactError::Decryption("message is not addressed to this keypair".to_string())
            })?;

        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        key.copy_from_slice(&content_key);

        let (nonce, ciphertext) = envelope[slots_end..].split_at(NONCE_SIZE);
        open_with(&key, nonce, ciphertext).ok_or_else(|| {
            PactError::Decryption("invalid key or corrupted data".to_string())
        })
    }
}

/// Derive the symmetric key shared by `secret`'s owner and `public`'s owner
fn key_encryption_key(secret: &SecretKey, public: &PublicKey) -> Zeroizing<[u8; KEY_SIZE]> {
    let secret = StaticSecret::from(*secret.as_bytes());
    let shared = secret.diffie_hellman(&X25519PublicKey::from(*public.as_bytes()));

    let mut hasher = Sha256::new();
    hasher.update(KEK_CONTEXT);
    hasher.update(shared.as_bytes());
    let digest = hasher.finalize();

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    key.copy_from_slice(&digest);
    key
}

/// Encrypt with a fresh random nonce
fn seal_with(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> PactResult<([u8; NONCE_SIZE], Vec<u8>)> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| PactError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| PactError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok((nonce_bytes, ciphertext))
}

/// Decrypt, returning `None` when authentication fails
fn open_with(key: &[u8; KEY_SIZE], nonce: &[u8], ciphertext: &[u8]) -> Option<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key).ok()?;
    cipher.decrypt(Nonce::from_slice(nonce), ciphertext).ok()
}
