//! Chain parameters and user-supplied key material.

use crate::classify::ContractLabels;
use crate::error::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fs;
use std::path::Path;

/// Consensus IO public key of Secret Network mainnet, base64.
pub const MAINNET_CONSENSUS_IO_PUBKEY: &str = "79++5YOHfm0SwhlpUDClv7cuCjq9xBZlWqSjDJWkRG8=";

/// HKDF salt used by the chain's transaction encryption, hex.
pub const DEFAULT_HKDF_SALT: &str =
    "000000000000000000024bead8df69990852c202db0e0097c1a12ea637d7e96d";

const MAINNET_CONSENSUS_IO_PUBKEY_BYTES: [u8; 32] = [
    0xef, 0xdf, 0xbe, 0xe5, 0x83, 0x87, 0x7e, 0x6d, 0x12, 0xc2, 0x19, 0x69, 0x50, 0x30, 0xa5,
    0xbf, 0xb7, 0x2e, 0x0a, 0x3a, 0xbd, 0xc4, 0x16, 0x65, 0x5a, 0xa4, 0xa3, 0x0c, 0x95, 0xa4,
    0x44, 0x6f,
];

const DEFAULT_HKDF_SALT_BYTES: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x4b, 0xea, 0xd8, 0xdf, 0x69,
    0x99, 0x08, 0x52, 0xc2, 0x02, 0xdb, 0x0e, 0x00, 0x97, 0xc1, 0xa1, 0x2e, 0xa6, 0x37, 0xd7,
    0xe9, 0x6d,
];

/// Per-chain constants needed to derive transaction encryption keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// X25519 public key of the chain's enclave.
    pub consensus_io_pubkey: [u8; 32],
    /// Salt for the HKDF step.
    pub hkdf_salt: [u8; 32],
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            consensus_io_pubkey: MAINNET_CONSENSUS_IO_PUBKEY_BYTES,
            hkdf_salt: DEFAULT_HKDF_SALT_BYTES,
        }
    }
}

impl ChainConfig {
    /// Build from the textual forms accepted on the command line.
    pub fn parse(consensus_io_pubkey: &str, hkdf_salt: &str) -> Result<Self> {
        let pubkey = STANDARD
            .decode(consensus_io_pubkey.trim())
            .map_err(|e| Error::InvalidKey(format!("consensus IO pubkey is not base64: {}", e)))?;
        let salt = hex::decode(strip_hex_prefix(hkdf_salt.trim()))?;

        Ok(ChainConfig {
            consensus_io_pubkey: to_array(&pubkey, "consensus IO pubkey")?,
            hkdf_salt: to_array(&salt, "HKDF salt")?,
        })
    }
}

/// Parse a 32-byte wallet encryption seed from hex text.
pub fn parse_seed(text: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(strip_hex_prefix(text.trim()))?;
    to_array(&bytes, "encryption seed")
}

/// Read a hex encryption seed from a file.
pub fn load_seed(path: &Path) -> Result<[u8; 32]> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| Error::IoError {
        path: Some(path.to_path_buf()),
        source: e,
    })?;
    parse_seed(&text)
}

/// Read a JSON object of contract address to display label.
pub fn load_labels(path: &Path) -> Result<ContractLabels> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| Error::IoError {
        path: Some(path.to_path_buf()),
        source: e,
    })?;
    serde_json::from_str(&text)
        .map_err(|e| Error::InvalidJson(format!("labels file {}: {}", path.display(), e)))
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

fn to_array(bytes: &[u8], what: &str) -> Result<[u8; 32]> {
    bytes
        .try_into()
        .map_err(|_| Error::InvalidKey(format!("{} must be 32 bytes, got {}", what, bytes.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_matches_textual_constants() {
        let parsed = ChainConfig::parse(MAINNET_CONSENSUS_IO_PUBKEY, DEFAULT_HKDF_SALT).unwrap();
        assert_eq!(parsed, ChainConfig::default());
    }

    #[test]
    fn test_parse_rejects_short_pubkey() {
        let result = ChainConfig::parse("AAAA", DEFAULT_HKDF_SALT);
        assert!(matches!(result, Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_parse_seed_with_prefix() {
        let seed = parse_seed(&format!("0x{}\n", "01".repeat(32))).unwrap();
        assert_eq!(seed, [1u8; 32]);
    }

    #[test]
    fn test_parse_seed_wrong_length() {
        assert!(matches!(parse_seed("abcd"), Err(Error::InvalidKey(_))));
        assert!(matches!(parse_seed("zz"), Err(Error::InvalidHex(_))));
    }

    #[test]
    fn test_load_labels() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"secret1token": "sSCRT"}}"#).unwrap();

        let labels = load_labels(file.path()).unwrap();
        assert_eq!(labels.get("secret1token").map(String::as_str), Some("sSCRT"));
    }

    #[test]
    fn test_load_seed_missing_file() {
        let result = load_seed(Path::new("/nonexistent/seed.hex"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
