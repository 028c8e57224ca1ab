//! Encrypt and decrypt commands

use std::io::{self, Write};

use super::input::{value_or_stdin, InputKind};
use crate::config::ConfigStore;
use crate::crypto::CryptoEngine;
use crate::error::PactResult;
use crate::services::EnvelopeService;

/// Encrypt a message for a pact and print the base64 ciphertext
pub fn handle_create<E: CryptoEngine>(
    store: &ConfigStore,
    engine: &E,
    pact: &str,
    message: Option<String>,
) -> PactResult<()> {
    let message = value_or_stdin(message, "message", InputKind::Verbatim)?;
    let ciphertext =
        EnvelopeService::new(store.config(), engine).encrypt_for(pact, message.as_bytes())?;
    println!("{}", ciphertext);
    Ok(())
}

/// Decrypt a base64 ciphertext and print the plaintext
pub fn handle_read<E: CryptoEngine>(
    store: &ConfigStore,
    engine: &E,
    ciphertext: Option<String>,
) -> PactResult<()> {
    let ciphertext = value_or_stdin(ciphertext, "ciphertext", InputKind::Trimmed)?;
    let plaintext = EnvelopeService::new(store.config(), engine).decrypt(&ciphertext)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&plaintext)?;
    if !plaintext.ends_with(b"\n") {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
