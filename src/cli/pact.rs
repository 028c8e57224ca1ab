//! Pact CLI commands
//!
//! Every mutating command persists the configuration before returning.

use std::io::{self, BufRead, Write};

use tracing::debug;

use super::input::{value_or_stdin, InputKind};
use crate::config::ConfigStore;
use crate::error::{PactError, PactResult};
use crate::services::PactRegistry;

/// Create an empty pact
pub fn handle_new(store: &mut ConfigStore, name: &str) -> PactResult<()> {
    if !PactRegistry::new(store.config_mut()).create(name)? {
        println!("Pact '{}' already exists, leaving it unchanged", name);
    }
    store.persist()
}

/// Print all pacts as indented JSON
pub fn handle_list(store: &ConfigStore) -> PactResult<()> {
    let json = serde_json::to_string_pretty(&store.config().pacts)?;
    println!("{}", json);
    Ok(())
}

/// Add a key, given as an argument or piped in, to a pact
pub fn handle_add_key(store: &mut ConfigStore, name: &str, key: Option<String>) -> PactResult<()> {
    let key = value_or_stdin(key, "public key", InputKind::Trimmed)?;
    PactRegistry::new(store.config_mut()).add_key(name, &key)?;
    store.persist()
}

/// Remove one key from a pact
///
/// Without `index` the members are listed and the index is read from stdin.
pub fn handle_rm_key(store: &mut ConfigStore, name: &str, index: Option<usize>) -> PactResult<()> {
    let index = match index {
        Some(index) => index,
        None => {
            let registry = PactRegistry::new(store.config_mut());
            let members = registry.members(name);
            if members.is_empty() {
                return Err(PactError::PactNotFound(name.to_string()));
            }
            let stdin = io::stdin();
            prompt_index(members, &mut stdin.lock(), &mut io::stdout())?
        }
    };

    let removed = PactRegistry::new(store.config_mut()).remove_key_at(name, index)?;
    debug!(pact = name, key = %removed, "removed member");
    store.persist()
}

/// Delete a pact and all of its keys
pub fn handle_rm(store: &mut ConfigStore, name: &str) -> PactResult<()> {
    if !PactRegistry::new(store.config_mut()).delete(name) {
        debug!(pact = name, "no such pact, nothing to delete");
    }
    store.persist()
}

/// List `members` and read the index of the one to remove
fn prompt_index<R: BufRead, W: Write>(
    members: &[String],
    input: &mut R,
    output: &mut W,
) -> PactResult<usize> {
    for (i, key) in members.iter().enumerate() {
        writeln!(output, "[{}] {}", i, key)?;
    }
    writeln!(output, "Which key would you like to remove?")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    line.trim()
        .parse::<usize>()
        .map_err(|_| PactError::Validation(format!("Unexpected input: '{}'", line.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members() -> Vec<String> {
        vec!["alpha".to_string(), "beta".to_string()]
    }

    #[test]
    fn test_prompt_lists_members_and_reads_index() {
        let mut input = "1\n".as_bytes();
        let mut output = Vec::new();

        let index = prompt_index(&members(), &mut input, &mut output).unwrap();

        assert_eq!(index, 1);
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("[0] alpha"));
        assert!(shown.contains("[1] beta"));
    }

    #[test]
    fn test_prompt_rejects_non_numbers() {
        let mut input = "two\n".as_bytes();
        let err = prompt_index(&members(), &mut input, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, PactError::Validation(_)));

        let mut input = "-1\n".as_bytes();
        assert!(prompt_index(&members(), &mut input, &mut Vec::new()).is_err());
    }
}
