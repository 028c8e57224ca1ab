//! Configuration file discovery
//!
//! ## Search Order
//!
//! 1. An explicit path (the `--config` flag), when that file exists
//! 2. `.pact` in the start directory, then in each ancestor up to the root
//! 3. `.pact` in the global fallback directory (`~/.config/pact`)

use std::path::{Path, PathBuf};

use tracing::debug;

/// File name searched for when no explicit config path is given
pub const CONFIG_FILE_NAME: &str = ".pact";

/// Locate the configuration file for this invocation
///
/// Returns `None` when no file is found. That is a valid state: every value
/// can be supplied by flags, so callers only warn about it. `fallback_dir` is
/// `None` when the home directory is unknown.
pub fn locate(
    explicit: Option<&Path>,
    start_dir: &Path,
    fallback_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(explicit) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        if explicit.is_file() {
            debug!(path = %explicit.display(), "using explicit config file");
            return Some(explicit.to_path_buf());
        }
        debug!(path = %explicit.display(), "explicit config file does not exist, searching");
    }

    if let Some(found) = search_upward(start_dir) {
        debug!(path = %found.display(), "found config file in directory hierarchy");
        return Some(found);
    }

    let fallback = fallback_dir.and_then(config_file_in);
    if let Some(fallback) = fallback.filter(|p| p.is_file()) {
        debug!(path = %fallback.display(), "using global config file");
        return Some(fallback);
    }

    None
}

/// Walk from `start_dir` towards the root and return the nearest `.pact`
///
/// Only absolute start directories are walked; an empty or relative start
/// directory has no well-defined ancestors and yields `None`. The filesystem
/// root is the last directory checked.
pub fn search_upward(start_dir: &Path) -> Option<PathBuf> {
    if !start_dir.is_absolute() {
        return None;
    }

    start_dir
        .ancestors()
        .filter_map(config_file_in)
        .find(|candidate| candidate.is_file())
}

/// Path of the config file inside `dir`, or `None` for an empty directory path
pub fn config_file_in(dir: &Path) -> Option<PathBuf> {
    if dir.as_os_str().is_empty() {
        None
    } else {
        Some(dir.join(CONFIG_FILE_NAME))
    }
}
