//! Configuration model and store for pact
//!
//! The persisted configuration holds the two key file paths and the pact
//! registry. Values come from three sources, merged field by field:
//!
//! 1. Command-line flags, resolved against the working directory
//! 2. The config file, resolved against the directory containing it
//! 3. Built-in defaults under `~/.config/pact`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::locator;
use super::paths::PathResolver;
use crate::error::{PactError, PactResult};
use crate::storage::{read_json, write_json_atomic};

/// Default public key file name inside the global config directory
pub const DEFAULT_PUBLIC_KEY_FILE: &str = "naclPub.key";

/// Default private key file name inside the global config directory
pub const DEFAULT_PRIVATE_KEY_FILE: &str = "naclPriv.key";

/// Pact name to ordered member public keys
pub type Pacts = BTreeMap<String, Vec<String>>;

/// The persisted configuration aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Configuration {
    /// Absolute path to the public key file
    pub public_key_path: PathBuf,
    /// Absolute path to the private key file
    pub private_key_path: PathBuf,
    /// Named groups of member public keys
    #[serde(default)]
    pub pacts: Pacts,
}

/// Raw values as written in a config file, before path resolution
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileConfig {
    #[serde(default)]
    pub public_key_path: Option<String>,
    #[serde(default)]
    pub private_key_path: Option<String>,
    /// `null` and a missing field both mean "no pacts"
    #[serde(default)]
    pub pacts: Option<Pacts>,
}

/// Values explicitly supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub public_key: Option<String>,
    pub private_key: Option<String>,
}

/// Built-in fallback values
#[derive(Debug, Clone)]
pub struct Defaults {
    pub public_key_path: PathBuf,
    pub private_key_path: PathBuf,
}

impl Defaults {
    /// Default key locations inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            public_key_path: dir.join(DEFAULT_PUBLIC_KEY_FILE),
            private_key_path: dir.join(DEFAULT_PRIVATE_KEY_FILE),
        }
    }
}

/// One mergeable configuration field
struct FieldSpec {
    name: &'static str,
    from_file: fn(&FileConfig) -> Option<&str>,
    from_flags: fn(&FlagOverrides) -> Option<&str>,
    default: fn(&Defaults) -> &Path,
    slot: fn(&mut Configuration) -> &mut PathBuf,
}

fn file_public_key(file: &FileConfig) -> Option<&str> {
    file.public_key_path.as_deref()
}

fn file_private_key(file: &FileConfig) -> Option<&str> {
    file.private_key_path.as_deref()
}

fn flag_public_key(flags: &FlagOverrides) -> Option<&str> {
    flags.public_key.as_deref()
}

fn flag_private_key(flags: &FlagOverrides) -> Option<&str> {
    flags.private_key.as_deref()
}

fn default_public_key(defaults: &Defaults) -> &Path {
    &defaults.public_key_path
}

fn default_private_key(defaults: &Defaults) -> &Path {
    &defaults.private_key_path
}

fn public_key_slot(config: &mut Configuration) -> &mut PathBuf {
    &mut config.public_key_path
}

fn private_key_slot(config: &mut Configuration) -> &mut PathBuf {
    &mut config.private_key_path
}

static FIELDS: [FieldSpec; 2] = [
    FieldSpec {
        name: "PublicKeyPath",
        from_file: file_public_key,
        from_flags: flag_public_key,
        default: default_public_key,
        slot: public_key_slot,
    },
    FieldSpec {
        name: "PrivateKeyPath",
        from_file: file_private_key,
        from_flags: flag_private_key,
        default: default_private_key,
        slot: private_key_slot,
    },
];

/// Where the store looks for its configuration
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Value of `--config`, if given
    pub explicit_path: Option<String>,
    /// Key path flags
    pub flags: FlagOverrides,
    /// Process working directory; base for flag values and the upward search
    pub working_dir: PathBuf,
}

/// Owns the active configuration and the file it is persisted to
#[derive(Debug, Clone)]
pub struct ConfigStore {
    /// File the configuration is persisted to, if any
    path: Option<PathBuf>,
    /// Resolved `--config` value, whether or not the file exists
    explicit_path: Option<PathBuf>,
    /// Global fallback directory (`~/.config/pact`), unknown without a home
    global_dir: Option<PathBuf>,
    config: Configuration,
}

impl ConfigStore {
    /// Locate, load and merge the configuration for this invocation
    ///
    /// A missing config file is not an error: a warning is logged and the
    /// store is built from flags and defaults only.
    pub fn open(options: &LoadOptions, resolver: &PathResolver) -> PactResult<Self> {
        let global_dir = resolver.global_config_dir().ok();
        if global_dir.is_none() {
            debug!("home directory unknown, skipping the global config directory");
        }
        let working_dir = &options.working_dir;

        let explicit_path = options
            .explicit_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| resolver.resolve(p, working_dir))
            .transpose()?;

        let located =
            locator::locate(explicit_path.as_deref(), working_dir, global_dir.as_deref());

        let (file, file_base) = match &located {
            Some(path) => {
                let file = Self::load(path)?;
                let base = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| working_dir.clone());
                (file, base)
            }
            None => {
                warn!("No config file found, run the config command to generate one");
                (FileConfig::default(), working_dir.clone())
            }
        };

        let defaults = global_dir.as_deref().map(Defaults::in_dir);
        let config = Self::merge(
            &file,
            &options.flags,
            &file_base,
            working_dir,
            defaults.as_ref(),
            resolver,
        )?;

        Ok(Self {
            path: located,
            explicit_path,
            global_dir,
            config,
        })
    }

    /// Build a store around an in-memory configuration (useful for testing)
    pub fn from_parts(path: Option<PathBuf>, global_dir: PathBuf, config: Configuration) -> Self {
        Self {
            path,
            explicit_path: None,
            global_dir: Some(global_dir),
            config,
        }
    }

    /// Parse the config file at `path`
    pub fn load(path: &Path) -> PactResult<FileConfig> {
        let file: FileConfig = read_json(path)?;
        debug!(path = %path.display(), "loaded config file");
        Ok(file)
    }

    /// Merge file values, flag overrides and defaults field by field
    ///
    /// Precedence per field: explicit flag, then file, then default. Flag
    /// values resolve against `flag_base`, file values against `file_base`.
    /// Defaults are only consulted for fields no other source sets; without
    /// them such a field is an [`PactError::InvalidPath`].
    pub fn merge(
        file: &FileConfig,
        flags: &FlagOverrides,
        file_base: &Path,
        flag_base: &Path,
        defaults: Option<&Defaults>,
        resolver: &PathResolver,
    ) -> PactResult<Configuration> {
        let mut config = Configuration {
            public_key_path: PathBuf::new(),
            private_key_path: PathBuf::new(),
            pacts: file.pacts.clone().unwrap_or_default(),
        };

        for field in &FIELDS {
            let file_value = (field.from_file)(file).filter(|v| !v.is_empty());

            let (value, origin) = if let Some(raw) = (field.from_flags)(flags) {
                (resolver.resolve(raw, flag_base)?, "flag")
            } else if let Some(raw) = file_value {
                (resolver.resolve(raw, file_base)?, "file")
            } else if let Some(defaults) = defaults {
                ((field.default)(defaults).to_path_buf(), "default")
            } else {
                return Err(PactError::invalid_path(
                    "~",
                    format!(
                        "no {} given and the home directory could not be determined",
                        field.name
                    ),
                ));
            };

            debug!(field = field.name, origin, value = %value.display(), "merged config field");
            *(field.slot)(&mut config) = value;
        }

        Ok(config)
    }

    /// Write the configuration back to its file
    pub fn persist(&self) -> PactResult<()> {
        let path = self.path.as_ref().ok_or(PactError::ConfigNotFound)?;
        write_json_atomic(path, &self.config)?;
        info!(path = %path.display(), "persisted configuration");
        Ok(())
    }

    /// Point the store at a different file for subsequent persists
    pub fn retarget(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// File backing this store, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Resolved `--config` value, if one was given
    pub fn explicit_path(&self) -> Option<&Path> {
        self.explicit_path.as_deref()
    }

    /// Global fallback directory, if the home directory is known
    pub fn global_dir(&self) -> Option<&Path> {
        self.global_dir.as_deref()
    }

    /// The active configuration
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Mutable access to the active configuration
    pub fn config_mut(&mut self) -> &mut Configuration {
        &mut self.config
    }
}
