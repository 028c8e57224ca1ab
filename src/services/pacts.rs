//! Pact registry
//!
//! Edits the pact mapping of the in-memory configuration. Nothing here
//! touches the config file; callers persist through the
//! [`ConfigStore`](crate::config::ConfigStore) after a mutation.

use tracing::{debug, info};

use super::keys::KeyManager;
use crate::config::{Configuration, Pacts};
use crate::crypto::CryptoEngine;
use crate::error::{PactError, PactResult};

/// Reserved pact holding only the caller's own public key
pub const SELF_PACT: &str = "self";

/// Outcome of reconciling the `self` pact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfPact {
    /// The keypair was already on disk
    Existing,
    /// A keypair had to be generated first
    Generated,
}

/// CRUD over the pacts of a configuration
pub struct PactRegistry<'a> {
    pacts: &'a mut Pacts,
}

impl<'a> PactRegistry<'a> {
    pub fn new(config: &'a mut Configuration) -> Self {
        Self {
            pacts: &mut config.pacts,
        }
    }

    /// Create an empty pact
    ///
    /// An existing pact keeps its members. Returns whether a pact was added.
    pub fn create(&mut self, name: &str) -> PactResult<bool> {
        validate_name(name)?;

        if self.pacts.contains_key(name) {
            debug!(pact = name, "pact already exists, leaving it unchanged");
            return Ok(false);
        }

        self.pacts.insert(name.to_string(), Vec::new());
        info!(pact = name, "created pact");
        Ok(true)
    }

    /// All pacts and their members
    pub fn list(&self) -> &Pacts {
        self.pacts
    }

    /// Members of a pact; empty when the pact does not exist
    pub fn members(&self, name: &str) -> &[String] {
        self.pacts.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append a key to a pact, creating the pact if needed
    pub fn add_key(&mut self, name: &str, key: &str) -> PactResult<()> {
        validate_name(name)?;

        let key = key.trim();
        if key.is_empty() {
            return Err(PactError::Validation("Public key cannot be empty".into()));
        }

        self.pacts
            .entry(name.to_string())
            .or_default()
            .push(key.to_string());
        info!(pact = name, "added key to pact");
        Ok(())
    }

    /// Remove the member at `index`, returning it
    pub fn remove_key_at(&mut self, name: &str, index: usize) -> PactResult<String> {
        let members = match self.pacts.get_mut(name) {
            Some(members) if !members.is_empty() => members,
            _ => return Err(PactError::PactNotFound(name.to_string())),
        };

        if index >= members.len() {
            return Err(PactError::IndexOutOfRange {
                pact: name.to_string(),
                index,
                len: members.len(),
            });
        }

        let removed = members.remove(index);
        info!(pact = name, index, "removed key from pact");
        Ok(removed)
    }

    /// Delete a pact; returns whether it existed
    pub fn delete(&mut self, name: &str) -> bool {
        let existed = self.pacts.remove(name).is_some();
        if existed {
            info!(pact = name, "deleted pact");
        }
        existed
    }

    /// Make the `self` pact hold exactly the caller's public key
    ///
    /// Only a complete keypair is read. When either half is missing, `self`
    /// is emptied and a keypair is generated (rewriting a lone half), then
    /// the key is read once more. A generation failure is returned and `self`
    /// stays empty.
    pub fn set_self_pact<E: CryptoEngine>(
        &mut self,
        keys: &KeyManager<'_, E>,
    ) -> PactResult<SelfPact> {
        if keys.keypair_exists() {
            let key = keys.read_public_key()?;
            self.pacts.insert(SELF_PACT.to_string(), vec![key]);
            return Ok(SelfPact::Existing);
        }

        self.pacts.insert(SELF_PACT.to_string(), Vec::new());
        info!("keypair doesn't exist, generating one");
        keys.generate()?;

        let key = keys.read_public_key()?;
        self.pacts.insert(SELF_PACT.to_string(), vec![key]);
        Ok(SelfPact::Generated)
    }
}

fn validate_name(name: &str) -> PactResult<()> {
    if name.trim().is_empty() {
        return Err(PactError::Validation("Pact name cannot be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Keypair, PublicKey, SealedEnvelopeEngine};
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    fn empty_config(dir: &TempDir) -> Configuration {
        Configuration {
            public_key_path: dir.path().join("naclPub.key"),
            private_key_path: dir.path().join("naclPriv.key"),
            pacts: Pacts::new(),
        }
    }

    /// Engine whose key generation always fails
    struct BrokenEngine {
        generate_calls: Cell<usize>,
    }

    impl CryptoEngine for BrokenEngine {
        fn generate_keypair(&self) -> PactResult<Keypair> {
            self.generate_calls.set(self.generate_calls.get() + 1);
            Err(PactError::Encryption("no entropy".into()))
        }

        fn seal(&self, _: &[u8], _: &[PublicKey], _: &Keypair) -> PactResult<Vec<u8>> {
            unimplemented!()
        }

        fn open(&self, _: &[u8], _: &Keypair) -> PactResult<Vec<u8>> {
            unimplemented!()
        }
    }

    #[test]
    fn test_create_and_list() {
        let dir = TempDir::new().unwrap();
        let mut config = empty_config(&dir);
        let mut registry = PactRegistry::new(&mut config);

        assert!(registry.create("friends").unwrap());
        assert_eq!(registry.list().get("friends"), Some(&Vec::new()));
    }

    #[test]
    fn test_create_existing_keeps_members() {
        let dir = TempDir::new().unwrap();
        let mut config = empty_config(&dir);
        let mut registry = PactRegistry::new(&mut config);
        registry.add_key("friends", "k1").unwrap();

        assert!(!registry.create("friends").unwrap());
        assert_eq!(registry.members("friends"), ["k1"]);
    }

    #[test]
    fn test_add_key_trims_and_creates() {
        let dir = TempDir::new().unwrap();
        let mut config = empty_config(&dir);
        let mut registry = PactRegistry::new(&mut config);

        registry.add_key("friends", "  abcKeyString\n").unwrap();
        registry.add_key("friends", "abcKeyString").unwrap();

        // Duplicates are allowed
        assert_eq!(registry.members("friends"), ["abcKeyString", "abcKeyString"]);
    }

    #[test]
    fn test_add_key_rejects_blank_input() {
        let dir = TempDir::new().unwrap();
        let mut config = empty_config(&dir);
        let mut registry = PactRegistry::new(&mut config);

        assert!(matches!(
            registry.add_key("friends", "  \n"),
            Err(PactError::Validation(_))
        ));
        assert!(matches!(
            registry.add_key(" ", "key"),
            Err(PactError::Validation(_))
        ));
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_remove_key_preserves_order() {
        let dir = TempDir::new().unwrap();
        let mut config = empty_config(&dir);
        let mut registry = PactRegistry::new(&mut config);
        for key in ["a", "b", "c", "d"] {
            registry.add_key("team", key).unwrap();
        }

        let removed = registry.remove_key_at("team", 1).unwrap();

        assert_eq!(removed, "b");
        assert_eq!(registry.members("team"), ["a", "c", "d"]);
    }

    #[test]
    fn test_remove_key_errors() {
        let dir = TempDir::new().unwrap();
        let mut config = empty_config(&dir);
        let mut registry = PactRegistry::new(&mut config);
        registry.create("empty").unwrap();
        registry.add_key("team", "a").unwrap();

        assert!(matches!(
            registry.remove_key_at("missing", 0),
            Err(PactError::PactNotFound(_))
        ));
        assert!(matches!(
            registry.remove_key_at("empty", 0),
            Err(PactError::PactNotFound(_))
        ));
        assert!(matches!(
            registry.remove_key_at("team", 1),
            Err(PactError::IndexOutOfRange { index: 1, len: 1, .. })
        ));
        assert_eq!(registry.members("team"), ["a"]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut config = empty_config(&dir);
        let mut registry = PactRegistry::new(&mut config);
        registry.create("friends").unwrap();

        assert!(registry.delete("friends"));
        assert!(!registry.delete("friends"));
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_set_self_pact_with_existing_keypair() {
        let dir = TempDir::new().unwrap();
        let mut config = empty_config(&dir);
        let engine = SealedEnvelopeEngine;
        let public = KeyManager::new(&config, &engine).generate().unwrap();
        config
            .pacts
            .insert(SELF_PACT.into(), vec!["stale".into(), "other".into()]);

        let keys = KeyManager::new(&config, &engine);
        let outcome = PactRegistry::new(&mut config).set_self_pact(&keys).unwrap();

        assert_eq!(outcome, SelfPact::Existing);
        assert_eq!(config.pacts[SELF_PACT], vec![public.to_base64()]);
    }

    #[test]
    fn test_set_self_pact_generates_missing_keypair() {
        let dir = TempDir::new().unwrap();
        let mut config = empty_config(&dir);
        let engine = SealedEnvelopeEngine;
        let keys = KeyManager::new(&config, &engine);

        let outcome = PactRegistry::new(&mut config).set_self_pact(&keys).unwrap();

        assert_eq!(outcome, SelfPact::Generated);
        let on_disk = fs::read_to_string(&config.public_key_path).unwrap();
        assert_eq!(config.pacts[SELF_PACT], vec![on_disk.trim().to_string()]);
    }

    #[test]
    fn test_set_self_pact_repairs_lone_public_key() {
        let dir = TempDir::new().unwrap();
        let mut config = empty_config(&dir);
        let engine = SealedEnvelopeEngine;
        let stale = KeyManager::new(&config, &engine).generate().unwrap();
        fs::remove_file(&config.private_key_path).unwrap();

        let keys = KeyManager::new(&config, &engine);
        let outcome = PactRegistry::new(&mut config).set_self_pact(&keys).unwrap();

        assert_eq!(outcome, SelfPact::Generated);
        assert!(keys.keypair_exists());
        let fresh = keys.load_keypair().unwrap();
        assert_ne!(fresh.public(), &stale);
        assert_eq!(config.pacts[SELF_PACT], vec![fresh.public().to_base64()]);
    }

    #[test]
    fn test_set_self_pact_leaves_self_empty_for_lone_public_key_on_failure() {
        let dir = TempDir::new().unwrap();
        let mut config = empty_config(&dir);
        KeyManager::new(&config, &SealedEnvelopeEngine).generate().unwrap();
        fs::remove_file(&config.private_key_path).unwrap();
        let engine = BrokenEngine {
            generate_calls: Cell::new(0),
        };
        let keys = KeyManager::new(&config, &engine);

        let err = PactRegistry::new(&mut config).set_self_pact(&keys).unwrap_err();

        assert!(matches!(err, PactError::Encryption(_)));
        assert!(config.pacts[SELF_PACT].is_empty());
    }

    #[test]
    fn test_set_self_pact_tries_generation_once() {
        let dir = TempDir::new().unwrap();
        let mut config = empty_config(&dir);
        config.pacts.insert(SELF_PACT.into(), vec!["stale".into()]);
        let engine = BrokenEngine {
            generate_calls: Cell::new(0),
        };
        let keys = KeyManager::new(&config, &engine);

        let err = PactRegistry::new(&mut config).set_self_pact(&keys).unwrap_err();

        assert!(matches!(err, PactError::Encryption(_)));
        assert_eq!(engine.generate_calls.get(), 1);
        assert!(config.pacts[SELF_PACT].is_empty());
    }
}
