//! Storage layer for pact
//!
//! Provides JSON file storage with atomic writes and owner-only key files.

pub mod file_io;

pub use file_io::{read_json, write_json_atomic, write_private_file};
