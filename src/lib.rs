//! pact - Encrypt messages for named groups of public keys
//!
//! This library provides the core functionality for the `pact` command-line
//! tool. A pact is a named, ordered list of member public keys; a message
//! encrypted for a pact can be read by every member.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Config file discovery, path resolution, merging and persistence
//! - `error`: Custom error types and exit statuses
//! - `storage`: JSON and key file I/O
//! - `crypto`: The cryptographic engine trait and its default implementation
//! - `services`: Key management, the pact registry and the envelope service
//! - `cli`: Command handlers used by the `pact` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use pact::config::{ConfigStore, LoadOptions, PathResolver};
//! use pact::crypto::SealedEnvelopeEngine;
//! use pact::services::EnvelopeService;
//!
//! let store = ConfigStore::open(&LoadOptions::default(), &PathResolver::from_env())?;
//! let service = EnvelopeService::new(store.config(), &SealedEnvelopeEngine);
//! let ciphertext = service.encrypt_for("self", b"note to self")?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod services;
pub mod storage;

pub use error::{PactError, PactResult};
