//! Configuration CLI commands
//!
//! `config` writes a fresh config file; `info` shows what the current
//! invocation resolved to.

use std::path::{Path, PathBuf};

use crate::config::{ConfigStore, PathResolver, CONFIG_FILE_NAME};
use crate::crypto::CryptoEngine;
use crate::error::{PactError, PactResult};
use crate::services::{KeyManager, KeypairState, PactRegistry, SelfPact};

/// Where `config` should write: `dir/.pact`, else `--config`, else the
/// global fallback
pub fn config_target(
    store: &ConfigStore,
    resolver: &PathResolver,
    working_dir: &Path,
    dir: Option<&str>,
) -> PactResult<PathBuf> {
    if let Some(dir) = dir {
        return Ok(resolver.resolve(dir, working_dir)?.join(CONFIG_FILE_NAME));
    }
    if let Some(explicit) = store.explicit_path() {
        return Ok(explicit.to_path_buf());
    }

    store
        .global_dir()
        .map(|global| global.join(CONFIG_FILE_NAME))
        .ok_or_else(|| {
            PactError::invalid_path("~", "home directory could not be determined")
        })
}

/// Generate a config file holding the resolved key paths and a `self` pact
///
/// Generates a keypair first when none exists. An existing file is never
/// overwritten.
pub fn handle_config<E: CryptoEngine>(
    store: &mut ConfigStore,
    engine: &E,
    resolver: &PathResolver,
    working_dir: &Path,
    dir: Option<&str>,
) -> PactResult<()> {
    let target = config_target(store, resolver, working_dir, dir)?;
    if target.exists() {
        return Err(PactError::ConfigExists(target));
    }

    store.retarget(target.clone());

    // A new file starts with no pacts besides `self`
    store.config_mut().pacts.clear();

    let keys = KeyManager::new(store.config(), engine);
    let outcome = PactRegistry::new(store.config_mut()).set_self_pact(&keys)?;
    store.persist()?;

    if outcome == SelfPact::Generated {
        println!("Generated a new keypair:");
        println!("  Public key:  {}", keys.public_key_path().display());
        println!("  Private key: {}", keys.private_key_path().display());
    }
    println!("Wrote configuration to {}", target.display());
    Ok(())
}

/// Show the configuration source, key paths and pact count
pub fn handle_info<E: CryptoEngine>(store: &ConfigStore, engine: &E) -> PactResult<()> {
    let config = store.config();
    let keys = KeyManager::new(config, engine);

    let source = store
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none, using defaults)".to_string());
    let state = match keys.state() {
        KeypairState::Present => "present".to_string(),
        KeypairState::Missing => "missing".to_string(),
        KeypairState::Partial { missing } => format!("incomplete ({:?} half missing)", missing),
    };

    println!("pact configuration");
    println!("==================");
    println!("Config file:      {}", source);
    let global = store
        .global_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unknown, no home directory)".to_string());
    println!("Global directory: {}", global);
    println!("Public key:       {}", config.public_key_path.display());
    println!("Private key:      {}", config.private_key_path.display());
    println!("Keypair:          {}", state);
    println!("Pacts:            {}", config.pacts.len());
    Ok(())
}
