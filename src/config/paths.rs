//! Path resolution for pact
//!
//! Configuration values that name files may be written as absolute paths,
//! relative paths, or with a leading `~`. Relative values mean different
//! things depending on where they came from, so every resolution takes the
//! base directory as an explicit argument instead of consulting the process
//! working directory.
//!
//! ## Resolution Rules
//!
//! 1. A leading `~` (alone or followed by a separator) becomes the home directory
//! 2. Absolute paths are kept, only lexically normalized
//! 3. Anything else is joined onto the base directory and normalized

use std::path::{Component, Path, PathBuf};

use crate::error::{PactError, PactResult};

/// Name of the directory under `~/.config` holding the global configuration
const APP_DIR_NAME: &str = "pact";

/// Resolves path strings against explicit base directories
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Home directory used for `~` expansion, if one could be determined
    home: Option<PathBuf>,
}

impl PathResolver {
    /// Create a resolver using the current user's home directory
    pub fn from_env() -> Self {
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Self { home }
    }

    /// Create a resolver with a fixed home directory (useful for testing)
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }

    /// Create a resolver that cannot expand `~`
    pub fn without_home() -> Self {
        Self { home: None }
    }

    /// Get the home directory, if known
    pub fn home_dir(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Get the global configuration directory (`~/.config/pact`)
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn global_config_dir(&self) -> PactResult<PathBuf> {
        let home = self
            .home
            .as_ref()
            .ok_or_else(|| PactError::invalid_path("~", "home directory could not be determined"))?;
        Ok(home.join(".config").join(APP_DIR_NAME))
    }

    /// Resolve `path` to a normalized absolute path
    ///
    /// `base` is only consulted when `path` is relative after `~` expansion,
    /// and must itself be absolute.
    pub fn resolve(&self, path: &str, base: &Path) -> PactResult<PathBuf> {
        if path.is_empty() {
            return Err(PactError::invalid_path(path, "path is empty"));
        }

        let expanded = self.expand_home(path)?;
        if expanded.is_absolute() {
            return Ok(normalize(&expanded));
        }

        if !base.is_absolute() {
            return Err(PactError::invalid_path(
                path,
                format!("base directory {} is not absolute", base.display()),
            ));
        }

        Ok(normalize(&base.join(expanded)))
    }

    fn expand_home(&self, path: &str) -> PactResult<PathBuf> {
        let Some(rest) = path.strip_prefix('~') else {
            return Ok(PathBuf::from(path));
        };

        // `~user` is not supported and stays a literal relative path
        let rest_is_home_relative = rest.is_empty() || rest.starts_with(std::path::is_separator);
        if !rest_is_home_relative {
            return Ok(PathBuf::from(path));
        }

        let home = self
            .home
            .as_ref()
            .ok_or_else(|| PactError::invalid_path(path, "home directory could not be determined"))?;

        let rest = rest.trim_start_matches(std::path::is_separator);
        if rest.is_empty() {
            Ok(home.clone())
        } else {
            Ok(home.join(rest))
        }
    }
}

/// Lexically normalize a path: drop `.` segments, fold `..` segments and
/// trailing separators. Symlinks are not consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolver() -> PathResolver {
        PathResolver::with_home("/home/u")
    }

    #[test]
    fn test_absolute_path_is_base_independent() {
        let resolver = resolver();
        for base in ["/", "/tmp", "/var/lib/pact"] {
            let resolved = resolver.resolve("/etc/pact/pub.key", Path::new(base)).unwrap();
            assert_eq!(resolved, PathBuf::from("/etc/pact/pub.key"));
        }
    }

    #[test]
    fn test_home_expansion_ignores_base() {
        let resolver = resolver();
        let resolved = resolver.resolve("~/config/.pact", Path::new("/srv")).unwrap();
        assert_eq!(resolved, PathBuf::from("/home/u/config/.pact"));

        let resolved = resolver.resolve("~", Path::new("/srv")).unwrap();
        assert_eq!(resolved, PathBuf::from("/home/u"));
    }

    #[test]
    fn test_relative_path_uses_base() {
        let resolver = resolver();
        let resolved = resolver.resolve("keys/pub.key", Path::new("/srv/app")).unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/app/keys/pub.key"));
    }

    #[test]
    fn test_dot_segments_are_normalized() {
        let resolver = resolver();
        let resolved = resolver
            .resolve("./keys/../priv/./naclPriv.key/", Path::new("/srv/app/"))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/app/priv/naclPriv.key"));

        let resolved = resolver.resolve("../../../../x", Path::new("/a")).unwrap();
        assert_eq!(resolved, PathBuf::from("/x"));
    }

    #[test]
    fn test_tilde_user_is_literal() {
        let resolver = resolver();
        let resolved = resolver.resolve("~bob/key", Path::new("/srv")).unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/~bob/key"));
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let err = resolver().resolve("", Path::new("/srv")).unwrap_err();
        assert!(matches!(err, PactError::InvalidPath { .. }));
    }

    #[test]
    fn test_tilde_without_home_is_invalid() {
        let err = PathResolver::without_home()
            .resolve("~/key", Path::new("/srv"))
            .unwrap_err();
        assert!(matches!(err, PactError::InvalidPath { .. }));

        // Paths that do not ask for expansion still resolve
        let resolved = PathResolver::without_home()
            .resolve("key", Path::new("/srv"))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/key"));
    }

    #[test]
    fn test_relative_base_is_invalid() {
        let err = resolver().resolve("key", Path::new("srv")).unwrap_err();
        assert!(matches!(err, PactError::InvalidPath { .. }));
    }

    #[test]
    fn test_resolution_does_not_touch_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        let before = std::env::current_dir().unwrap();

        let resolved = resolver().resolve("pub.key", temp_dir.path()).unwrap();

        assert_eq!(resolved, temp_dir.path().join("pub.key"));
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_global_config_dir() {
        assert_eq!(
            resolver().global_config_dir().unwrap(),
            PathBuf::from("/home/u/.config/pact")
        );
        assert!(PathResolver::without_home().global_config_dir().is_err());
    }
}
