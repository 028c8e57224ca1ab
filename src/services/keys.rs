//! Keypair management
//!
//! Key files hold the base64 text of a 32-byte key. The two halves are
//! checked independently so that a half-written keypair can be told apart
//! from a missing one.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Configuration;
use crate::crypto::{CryptoEngine, Keypair, PublicKey, SecretKey};
use crate::error::{PactError, PactResult};
use crate::storage::write_private_file;

/// Which half of a keypair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHalf {
    Public,
    Private,
}

/// What is on disk at the configured key paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypairState {
    /// Both files exist
    Present,
    /// Neither file exists
    Missing,
    /// Exactly one file exists
    Partial { missing: KeyHalf },
}

/// Derives key locations from the configuration and manages the key files
pub struct KeyManager<'a, E: CryptoEngine> {
    public_key_path: PathBuf,
    private_key_path: PathBuf,
    engine: &'a E,
}

impl<'a, E: CryptoEngine> KeyManager<'a, E> {
    /// Create a key manager for the configured key paths
    pub fn new(config: &Configuration, engine: &'a E) -> Self {
        Self {
            public_key_path: config.public_key_path.clone(),
            private_key_path: config.private_key_path.clone(),
            engine,
        }
    }

    pub fn public_key_path(&self) -> &Path {
        &self.public_key_path
    }

    pub fn private_key_path(&self) -> &Path {
        &self.private_key_path
    }

    /// Inspect the key files
    pub fn state(&self) -> KeypairState {
        match (self.public_key_path.exists(), self.private_key_path.exists()) {
            (true, true) => KeypairState::Present,
            (false, false) => KeypairState::Missing,
            (true, false) => KeypairState::Partial {
                missing: KeyHalf::Private,
            },
            (false, true) => KeypairState::Partial {
                missing: KeyHalf::Public,
            },
        }
    }

    /// True only when both halves exist
    pub fn keypair_exists(&self) -> bool {
        self.state() == KeypairState::Present
    }

    /// Generate a keypair and write it to the configured paths
    ///
    /// Refuses to overwrite a complete keypair. A half-present keypair is
    /// reported as corrupt and both halves are rewritten. The private half
    /// is written first; a failure writing the public half leaves the
    /// keypair partial.
    pub fn generate(&self) -> PactResult<PublicKey> {
        match self.state() {
            KeypairState::Present => {
                return Err(PactError::KeypairAlreadyExists {
                    public: self.public_key_path.clone(),
                    private: self.private_key_path.clone(),
                });
            }
            KeypairState::Partial { missing } => {
                warn!(
                    ?missing,
                    public = %self.public_key_path.display(),
                    private = %self.private_key_path.display(),
                    "keypair appears corrupt, regenerating both halves"
                );
            }
            KeypairState::Missing => {}
        }

        let keypair = self.engine.generate_keypair()?;
        write_private_file(&self.private_key_path, keypair.secret().to_base64().as_bytes())?;
        write_private_file(&self.public_key_path, keypair.public().to_base64().as_bytes())?;

        info!(
            public = %self.public_key_path.display(),
            private = %self.private_key_path.display(),
            "generated new keypair"
        );
        Ok(*keypair.public())
    }

    /// Read the caller's public key as it appears in the key file
    pub fn read_public_key(&self) -> PactResult<String> {
        let text = read_key_file(&self.public_key_path)?;
        PublicKey::from_base64(&text)?;
        Ok(text)
    }

    /// Load and decode both halves of the caller's keypair
    pub fn load_keypair(&self) -> PactResult<Keypair> {
        let secret = SecretKey::from_base64(&read_key_file(&self.private_key_path)?)?;
        let public = PublicKey::from_base64(&read_key_file(&self.public_key_path)?)?;
        Ok(Keypair::new(public, secret))
    }
}

fn read_key_file(path: &Path) -> PactResult<String> {
    if !path.exists() {
        return Err(PactError::KeypairMissing(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| PactError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(contents.trim().to_string())
}
