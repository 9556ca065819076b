//! Transaction encryption key for Secret Network style chains.
//!
//! Key schedule per message:
//!
//! ```text
//! ikm = X25519(wallet_seed, consensus_io_pubkey) || nonce
//! key = HKDF-SHA256(salt = chain_hkdf_salt, ikm, info = "", 32 bytes)
//! ciphertext = AES-128-SIV(key, associated_data = [""], plaintext)
//! ```

use crate::config::ChainConfig;
use crate::decode::{EncryptedEnvelope, NONCE_SIZE, Nonce};
use crate::decrypt::{DecryptError, DecryptionCapability};
use aes_siv::{KeyInit, siv::Aes128Siv};
use async_trait::async_trait;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use std::fmt;
use x25519_dalek::{PublicKey, StaticSecret};

/// AES-SIV is invoked with a single empty associated-data header.
const ASSOCIATED_DATA: [&[u8]; 1] = [&[]];

/// Size of the derived AES-128-SIV key (two 128-bit halves).
const SIV_KEY_SIZE: usize = 32;

/// A wallet's transaction encryption key bound to one chain.
pub struct TxEncryptionKey {
    public_key: PublicKey,
    shared_secret: [u8; 32],
    hkdf_salt: [u8; 32],
}

impl fmt::Debug for TxEncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxEncryptionKey")
            .field("public_key", &hex::encode(self.public_key.as_bytes()))
            .finish_non_exhaustive()
    }
}

impl TxEncryptionKey {
    /// Build from a 32-byte seed (the X25519 private key).
    pub fn from_seed(seed: [u8; 32], chain: &ChainConfig) -> Self {
        let secret = StaticSecret::from(seed);
        let public_key = PublicKey::from(&secret);
        let io_key = PublicKey::from(chain.consensus_io_pubkey);
        let shared_secret = secret.diffie_hellman(&io_key).to_bytes();

        TxEncryptionKey {
            public_key,
            shared_secret,
            hkdf_salt: chain.hkdf_salt,
        }
    }

    /// The public key placed in the reserved region of outgoing envelopes.
    pub fn public_key(&self) -> [u8; 32] {
        self.public_key.to_bytes()
    }

    /// Encrypt a message input under a fresh random nonce.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedEnvelope, DecryptError> {
        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);
        let nonce = Nonce::new(nonce);

        Ok(EncryptedEnvelope {
            nonce,
            sender_public_key: self.public_key(),
            ciphertext: self.seal(plaintext, &nonce)?,
        })
    }

    /// Encrypt under an existing nonce (no envelope), as the chain does for
    /// event attributes and response data.
    pub fn seal(&self, plaintext: &[u8], nonce: &Nonce) -> Result<Vec<u8>, DecryptError> {
        let mut cipher = self.cipher(nonce)?;
        cipher
            .encrypt(ASSOCIATED_DATA, plaintext)
            .map_err(|_| DecryptError::Rejected("AES-SIV encryption failed".to_string()))
    }

    fn open(&self, ciphertext: &[u8], nonce: &Nonce) -> Result<Vec<u8>, DecryptError> {
        let mut cipher = self.cipher(nonce)?;
        cipher
            .decrypt(ASSOCIATED_DATA, ciphertext)
            .map_err(|_| DecryptError::Rejected("AES-SIV authentication failed".to_string()))
    }

    fn cipher(&self, nonce: &Nonce) -> Result<Aes128Siv, DecryptError> {
        let mut ikm = Vec::with_capacity(self.shared_secret.len() + NONCE_SIZE);
        ikm.extend_from_slice(&self.shared_secret);
        ikm.extend_from_slice(nonce.as_bytes());

        let hkdf = Hkdf::<Sha256>::new(Some(&self.hkdf_salt), &ikm);
        let mut key = [0u8; SIV_KEY_SIZE];
        hkdf.expand(&[], &mut key)
            .map_err(|e| DecryptError::Rejected(format!("HKDF expansion failed: {}", e)))?;

        Aes128Siv::new_from_slice(&key)
            .map_err(|e| DecryptError::Rejected(format!("invalid AES-SIV key: {}", e)))
    }
}

#[async_trait]
impl DecryptionCapability for TxEncryptionKey {
    async fn decrypt(&self, ciphertext: &[u8], nonce: &Nonce) -> Result<Vec<u8>, DecryptError> {
        self.open(ciphertext, nonce)
    }
}
