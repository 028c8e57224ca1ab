//! Custom error types for pact
//!
//! Every fallible operation in the crate returns [`PactResult`]. Errors are
//! plain values; only the binary decides how they become a process exit code
//! (see [`PactError::exit_status`]).

use std::path::PathBuf;

use thiserror::Error;

/// Process exit status categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Command completed
    Ok,
    /// Unexpected failure not attributable to caller input
    InternalError,
    /// Malformed or missing arguments, unknown pact, bad ciphertext
    BadRequest,
    /// `config` refused to overwrite an existing file
    ConfigExists,
}

impl ExitStatus {
    /// Numeric process exit code
    pub fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::InternalError => 1,
            Self::BadRequest => 2,
            Self::ConfigExists => 3,
        }
    }
}

/// The main error type for pact operations
#[derive(Error, Debug)]
pub enum PactError {
    /// No configuration file backs the current process
    #[error("No config file found, run the config command to generate one")]
    ConfigNotFound,

    /// A configuration file exists but could not be parsed
    #[error("Failed to parse config file {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    /// `config` refuses to overwrite an existing file
    #[error("Configuration file already exists at {0}, refusing to overwrite")]
    ConfigExists(PathBuf),

    /// A path could not be resolved
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Both halves of the keypair are already on disk
    #[error("Keypair already exists, refusing to overwrite (public: {public}, private: {private})")]
    KeypairAlreadyExists { public: PathBuf, private: PathBuf },

    /// A key file needed by the command is missing
    #[error("Key file not found: {0}. Run the key-gen command to create a keypair")]
    KeypairMissing(PathBuf),

    /// The pact has no members to remove
    #[error("No such pact: {0}")]
    PactNotFound(String),

    /// Member index outside the pact's member list
    #[error("Index {index} is out of range for pact '{pact}' ({len} members)")]
    IndexOutOfRange {
        pact: String,
        index: usize,
        len: usize,
    },

    /// Encryption was requested for a pact without members
    #[error("Config file does not contain keys for the pact: {0}")]
    UnknownPact(String),

    /// A key string or key file is not a valid key encoding
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Ciphertext is not valid base64
    #[error("Message formatting error (expected base64): {0}")]
    Encoding(String),

    /// The engine rejected the ciphertext
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// The engine failed to produce ciphertext
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Validation errors for command arguments
    #[error("Validation error: {0}")]
    Validation(String),

    /// A value was expected as an argument or on standard input
    #[error("Missing {0}: pass it as an argument or pipe it into the command")]
    MissingInput(&'static str),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl PactError {
    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error was caused by caller input rather than the environment
    pub fn is_user_error(&self) -> bool {
        self.exit_status() == ExitStatus::BadRequest
    }

    /// Map the error to the exit status the process should report
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::ConfigExists(_) => ExitStatus::ConfigExists,
            Self::ConfigNotFound
            | Self::InvalidPath { .. }
            | Self::KeypairAlreadyExists { .. }
            | Self::KeypairMissing(_)
            | Self::PactNotFound(_)
            | Self::IndexOutOfRange { .. }
            | Self::UnknownPact(_)
            | Self::InvalidKey(_)
            | Self::Encoding(_)
            | Self::Decryption(_)
            | Self::Validation(_)
            | Self::MissingInput(_) => ExitStatus::BadRequest,
            Self::ConfigParse { .. } | Self::Encryption(_) | Self::Io(_) | Self::Json(_) => {
                ExitStatus::InternalError
            }
        }
    }
}

impl From<std::io::Error> for PactError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PactError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for pact operations
pub type PactResult<T> = Result<T, PactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PactError::UnknownPact("friends".into());
        assert_eq!(
            err.to_string(),
            "Config file does not contain keys for the pact: friends"
        );
    }

    #[test]
    fn test_index_out_of_range_display() {
        let err = PactError::IndexOutOfRange {
            pact: "friends".into(),
            index: 4,
            len: 2,
        };
        assert_eq!(
            err.to_string(),
            "Index 4 is out of range for pact 'friends' (2 members)"
        );
    }

    #[test]
    fn test_user_errors_are_bad_requests() {
        assert!(PactError::PactNotFound("x".into()).is_user_error());
        assert!(PactError::Encoding("bad".into()).is_user_error());
        assert!(PactError::Decryption("bad".into()).is_user_error());
        assert!(PactError::MissingInput("message").is_user_error());
    }

    #[test]
    fn test_environment_errors_are_internal() {
        let parse = PactError::ConfigParse {
            path: PathBuf::from("/tmp/.pact"),
            reason: "expected value".into(),
        };
        assert_eq!(parse.exit_status(), ExitStatus::InternalError);
        assert_eq!(
            PactError::Io("disk".into()).exit_status(),
            ExitStatus::InternalError
        );
    }

    #[test]
    fn test_config_exists_has_distinct_status() {
        let status = PactError::ConfigExists(PathBuf::from("/tmp/.pact")).exit_status();
        assert_eq!(status, ExitStatus::ConfigExists);
        assert_eq!(status.code(), 3);
        assert_ne!(status.code(), ExitStatus::BadRequest.code());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let pact_err: PactError = io_err.into();
        assert!(matches!(pact_err, PactError::Io(_)));
    }
}
