//! Argument values that may arrive on standard input

use std::io::{self, IsTerminal, Read};

use crate::error::{PactError, PactResult};

/// How a piped value is cleaned up before use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Keys and ciphertext: surrounding whitespace is dropped
    Trimmed,
    /// Messages: used byte for byte
    Verbatim,
}

/// Use `arg` if given, otherwise read the value from a piped stdin
pub fn value_or_stdin(
    arg: Option<String>,
    what: &'static str,
    kind: InputKind,
) -> PactResult<String> {
    let stdin = io::stdin();
    let piped = !stdin.is_terminal();
    value_or_piped(arg, stdin.lock(), piped, what, kind)
}

/// Resolve a value from an argument or a reader
///
/// `piped` says whether `reader` carries input; an interactive terminal is
/// never read from. An empty value is [`PactError::MissingInput`].
pub fn value_or_piped<R: Read>(
    arg: Option<String>,
    mut reader: R,
    piped: bool,
    what: &'static str,
    kind: InputKind,
) -> PactResult<String> {
    let raw = match arg {
        Some(value) => value,
        None if piped => {
            let mut buf = String::new();
            reader
                .read_to_string(&mut buf)
                .map_err(|e| PactError::Io(format!("Failed to read {} from stdin: {}", what, e)))?;
            buf
        }
        None => return Err(PactError::MissingInput(what)),
    };

    let value = match kind {
        InputKind::Trimmed => raw.trim().to_string(),
        InputKind::Verbatim => raw,
    };

    if value.is_empty() {
        return Err(PactError::MissingInput(what));
    }
    Ok(value)
}
