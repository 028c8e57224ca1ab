//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod config;
pub mod envelope;
pub mod input;
pub mod keys;
pub mod pact;

pub use config::{handle_config, handle_info};
pub use envelope::{handle_create, handle_read};
pub use keys::{handle_key_export, handle_key_gen};
pub use pact::{handle_add_key, handle_list, handle_new, handle_rm, handle_rm_key};
