//! Error types for scrtx.
//!
//! These cover the command-line surface only. Field-level decryption
//! failures never reach this type; see [`crate::decrypt::DecryptError`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scrtx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in scrtx.
#[derive(Error, Debug)]
pub enum Error {
    /// No input was provided (no file, no stdin).
    #[error("No input provided. Use: scrtx <tx.json> or pipe a transaction to stdin")]
    NoInput,

    /// The specified file was not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// An I/O error occurred.
    #[error("IO error{}: {source}", path.as_ref().map(|p| format!(" reading {}", p.display())).unwrap_or_default())]
    IoError {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Input is not a transaction in the expected JSON shape.
    #[error("Invalid transaction JSON: {0}")]
    InvalidJson(String),

    /// Invalid hex input.
    #[error("Invalid hex input: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Key material or chain parameters are unusable.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// A standalone blob could not be decoded.
    #[error("Failed to decode: {0}")]
    DecodeFailed(String),

    /// `--check` was requested and nothing could be decrypted.
    #[error("No message input could be decrypted")]
    NotDecrypted,

    /// Invalid query syntax.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Requested field was not found.
    #[error("Field not found: '{0}'")]
    FieldNotFound(String),

    /// Array index out of bounds.
    #[error("Index {0} out of bounds")]
    IndexOutOfBounds(usize),

    /// Output formatting error.
    #[error("Format error: {0}")]
    FormatError(String),
}

impl Error {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Validation failure (--check mode)
            Error::DecodeFailed(_) | Error::NotDecrypted => 1,
            // Parse errors
            Error::InvalidJson(_) | Error::InvalidHex(_) | Error::InvalidKey(_) => 2,
            // I/O errors
            Error::NoInput | Error::FileNotFound(_) | Error::IoError { .. } => 3,
            // Query errors
            Error::InvalidQuery(_) | Error::FieldNotFound(_) | Error::IndexOutOfBounds(_) => 4,
            // Format errors
            Error::FormatError(_) => 5,
        }
    }
}
