//! Configuration module for pact
//!
//! This module provides configuration management including:
//! - Base-directory aware path resolution
//! - Config file discovery through the directory hierarchy
//! - Flag/file merging and persistence of the configuration model

pub mod locator;
pub mod paths;
pub mod settings;

pub use locator::{locate, CONFIG_FILE_NAME};
pub use paths::PathResolver;
pub use settings::{ConfigStore, Configuration, FlagOverrides, LoadOptions, Pacts};
