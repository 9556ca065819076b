//! Encrypted envelope layout for contract call inputs.
//!
//! Every encrypted contract input is carried inline as base64 of:
//!
//! ```text
//! [nonce (32 bytes) | sender public key (32 bytes) | ciphertext (variable)]
//! ```
//!
//! Event attributes, response data and error fragments are NOT enveloped:
//! they carry ciphertext only and are opened with the nonce recorded for
//! their message.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt;
use thiserror::Error;

/// Size of the per-message nonce in bytes.
pub const NONCE_SIZE: usize = 32;

/// Size of the reserved region following the nonce (sender's X25519 public key).
pub const RESERVED_SIZE: usize = 32;

/// Total fixed prefix ahead of the ciphertext.
pub const ENVELOPE_PREFIX_SIZE: usize = NONCE_SIZE + RESERVED_SIZE;

/// Reasons a blob is not an envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Blob is shorter than the fixed prefix.
    #[error("blob too short for an envelope: {0} bytes, need at least {ENVELOPE_PREFIX_SIZE}")]
    TooShort(usize),

    /// Blob is not valid base64.
    #[error("blob is not base64: {0}")]
    InvalidBase64(String),
}

/// A 32-byte per-message nonce.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    pub fn new(bytes: [u8; NONCE_SIZE]) -> Self {
        Nonce(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A parsed encrypted envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    /// Nonce the message was encrypted under.
    pub nonce: Nonce,
    /// Reserved region; the sender's ephemeral public key on this chain family.
    pub sender_public_key: [u8; RESERVED_SIZE],
    /// Ciphertext following the fixed prefix.
    pub ciphertext: Vec<u8>,
}

impl EncryptedEnvelope {
    /// Parse an envelope from a base64 string.
    pub fn from_base64(encoded: &str) -> Result<Self, EnvelopeError> {
        let blob = STANDARD
            .decode(encoded.trim())
            .map_err(|e| EnvelopeError::InvalidBase64(e.to_string()))?;
        decode_envelope(&blob)
    }

    /// Serialize back to the wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ENVELOPE_PREFIX_SIZE + self.ciphertext.len());
        out.extend_from_slice(self.nonce.as_bytes());
        out.extend_from_slice(&self.sender_public_key);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Serialize to base64, the form used inside transaction JSON.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }
}

/// Slice a raw blob into an envelope.
///
/// The length check is the only gate; whether the ciphertext is meaningful
/// is only discovered by decrypting it.
pub fn decode_envelope(blob: &[u8]) -> Result<EncryptedEnvelope, EnvelopeError> {
    if blob.len() < ENVELOPE_PREFIX_SIZE {
        return Err(EnvelopeError::TooShort(blob.len()));
    }

    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&blob[..NONCE_SIZE]);

    let mut sender_public_key = [0u8; RESERVED_SIZE];
    sender_public_key.copy_from_slice(&blob[NONCE_SIZE..ENVELOPE_PREFIX_SIZE]);

    Ok(EncryptedEnvelope {
        nonce: Nonce(nonce),
        sender_public_key,
        ciphertext: blob[ENVELOPE_PREFIX_SIZE..].to_vec(),
    })
}
