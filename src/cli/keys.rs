//! Key CLI commands

use crate::config::ConfigStore;
use crate::crypto::CryptoEngine;
use crate::error::PactResult;
use crate::services::{KeyManager, PactRegistry};

/// Generate a keypair at the configured paths
///
/// When a config file backs the store, the `self` pact is updated to the new
/// public key and persisted.
pub fn handle_key_gen<E: CryptoEngine>(store: &mut ConfigStore, engine: &E) -> PactResult<()> {
    let keys = KeyManager::new(store.config(), engine);
    keys.generate()?;

    println!("Generated a new keypair:");
    println!("  Public key:  {}", keys.public_key_path().display());
    println!("  Private key: {}", keys.private_key_path().display());

    if store.path().is_some() {
        PactRegistry::new(store.config_mut()).set_self_pact(&keys)?;
        store.persist()?;
    }
    Ok(())
}

/// Print the caller's public key
pub fn handle_key_export<E: CryptoEngine>(store: &ConfigStore, engine: &E) -> PactResult<()> {
    let key = KeyManager::new(store.config(), engine).read_public_key()?;
    println!("{}", key);
    Ok(())
}
