//! Decryption orchestration: envelope parsing, capability calls, nonce bookkeeping.

use crate::decode::{EncryptedEnvelope, Nonce};
use crate::decrypt::{DecryptError, DecryptionCapability, NonceTable};
use futures::future::join_all;
use tracing::debug;

/// A message input that was opened successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedInput {
    pub nonce: Nonce,
    pub plaintext: Vec<u8>,
}

/// Outcome of opening one message input during phase one.
#[derive(Debug)]
pub struct InputOutcome {
    pub index: usize,
    pub result: Result<Vec<u8>, DecryptError>,
}

/// Drives an optional [`DecryptionCapability`] one field at a time.
///
/// Every call yields a definite per-field result; nothing here panics or
/// aborts a whole transaction.
#[derive(Clone, Copy)]
pub struct DecryptionEngine<'a> {
    capability: Option<&'a dyn DecryptionCapability>,
}

impl<'a> DecryptionEngine<'a> {
    pub fn new(capability: Option<&'a dyn DecryptionCapability>) -> Self {
        DecryptionEngine { capability }
    }

    /// Whether a capability was supplied at all.
    pub fn is_available(&self) -> bool {
        self.capability.is_some()
    }

    /// Open a base64 envelope: parse it, then decrypt its ciphertext.
    pub async fn open_envelope(&self, encoded: &str) -> Result<OpenedInput, DecryptError> {
        let envelope = EncryptedEnvelope::from_base64(encoded)?;
        let plaintext = self.decrypt(&envelope.ciphertext, &envelope.nonce).await?;
        Ok(OpenedInput {
            nonce: envelope.nonce,
            plaintext,
        })
    }

    /// Phase one: open every message input concurrently and build the
    /// nonce table from the successes.
    ///
    /// The table is only returned once all inputs have settled, so no
    /// attribute or response can be opened against a partially built table.
    pub async fn open_inputs(&self, inputs: &[(usize, &str)]) -> (NonceTable, Vec<InputOutcome>) {
        let attempts = inputs.iter().map(|&(index, encoded)| async move {
            (index, self.open_envelope(encoded).await)
        });

        let mut table = NonceTable::new();
        let mut outcomes = Vec::with_capacity(inputs.len());

        for (index, result) in join_all(attempts).await {
            let result = match result {
                Ok(opened) => {
                    table.record(index, opened.nonce);
                    Ok(opened.plaintext)
                }
                Err(e) => {
                    debug!(msg_index = index, error = %e, "message input left encrypted");
                    Err(e)
                }
            };
            outcomes.push(InputOutcome { index, result });
        }

        (table, outcomes)
    }

    /// Open un-enveloped ciphertext belonging to message `index`, using the
    /// nonce recorded for it.
    pub async fn open_with_nonce(
        &self,
        table: &NonceTable,
        index: usize,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, DecryptError> {
        let nonce = table.get(index).ok_or(DecryptError::MissingNonce(index))?;
        self.decrypt(ciphertext, nonce).await
    }

    async fn decrypt(&self, ciphertext: &[u8], nonce: &Nonce) -> Result<Vec<u8>, DecryptError> {
        let capability = self.capability.ok_or(DecryptError::CapabilityUnavailable)?;
        capability.decrypt(ciphertext, nonce).await
    }
}
