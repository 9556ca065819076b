//! The injected decryption capability and field-level failure taxonomy.

use crate::decode::{EnvelopeError, Nonce};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a single field could not be opened.
///
/// None of these are fatal: the decoder leaves the field as received.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecryptError {
    /// Blob too short or not base64; treated as already-plaintext.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[from] EnvelopeError),

    /// The capability refused the ciphertext (wrong key, wrong sender, tampering).
    #[error("decryption rejected: {0}")]
    Rejected(String),

    /// No capability was supplied (e.g. no wallet connected).
    #[error("no decryption capability available")]
    CapabilityUnavailable,

    /// The field belongs to a message whose input was never opened.
    #[error("no nonce recorded for message {0}")]
    MissingNonce(usize),
}

/// Serializable classification of a [`DecryptError`], for display layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MalformedEnvelope,
    Rejected,
    CapabilityUnavailable,
    MissingNonce,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureKind::MalformedEnvelope => "not an envelope",
            FailureKind::Rejected => "rejected",
            FailureKind::CapabilityUnavailable => "no key",
            FailureKind::MissingNonce => "no nonce",
        };
        f.write_str(text)
    }
}

impl DecryptError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DecryptError::MalformedEnvelope(_) => FailureKind::MalformedEnvelope,
            DecryptError::Rejected(_) => FailureKind::Rejected,
            DecryptError::CapabilityUnavailable => FailureKind::CapabilityUnavailable,
            DecryptError::MissingNonce(_) => FailureKind::MissingNonce,
        }
    }
}

/// An opaque symmetric decryption operation, usually backed by a wallet.
///
/// Implementations must be deterministic: the same ciphertext and nonce
/// always yield the same plaintext.
#[async_trait]
pub trait DecryptionCapability: Send + Sync {
    /// Open `ciphertext` encrypted under the session key derived from `nonce`.
    async fn decrypt(&self, ciphertext: &[u8], nonce: &Nonce) -> Result<Vec<u8>, DecryptError>;
}
