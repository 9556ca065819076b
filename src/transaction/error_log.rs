//! Encrypted contract errors embedded in a failed transaction's raw log.

use crate::decrypt::{DecryptionEngine, NonceTable};
use crate::transaction::types::parse_msg_index;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// `...message index: 1: encrypted: <base64>: execute contract failed...`
static ENCRYPTED_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"message index: (\d+):(?: dispatch: submessages:)* encrypted: (.+?): (?:instantiate|execute|query|reply to|migrate) contract failed",
    )
    .expect("encrypted error pattern is valid")
});

/// A located encrypted fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedError<'a> {
    pub msg_index: usize,
    pub fragment: &'a str,
}

/// Find the single encrypted error fragment in a raw log.
pub fn find_encrypted_error(raw_log: &str) -> Option<EncryptedError<'_>> {
    let captures = ENCRYPTED_ERROR.captures(raw_log)?;
    let msg_index = parse_msg_index(captures.get(1)?.as_str())?;
    let fragment = captures.get(2)?.as_str();
    Some(EncryptedError {
        msg_index,
        fragment,
    })
}

/// Return the raw log with the encrypted fragment replaced by its plaintext,
/// or `None` when there is nothing that can be opened.
pub async fn decrypt_error_log(
    engine: &DecryptionEngine<'_>,
    nonces: &NonceTable,
    raw_log: &str,
) -> Option<String> {
    let found = find_encrypted_error(raw_log)?;

    let ciphertext = match STANDARD.decode(found.fragment) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "encrypted error fragment is not base64");
            return None;
        }
    };

    let plaintext = match engine
        .open_with_nonce(nonces, found.msg_index, &ciphertext)
        .await
    {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(msg_index = found.msg_index, error = %e, "error log left encrypted");
            return None;
        }
    };

    let text = String::from_utf8_lossy(&plaintext);
    let marker = format!("encrypted: {}", found.fragment);
    Some(raw_log.replacen(&marker, &text, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "failed to execute message; message index: 1: encrypted: QUJDRA==: execute contract failed";

    #[test]
    fn test_find_encrypted_error() {
        let found = find_encrypted_error(LOG).unwrap();
        assert_eq!(found.msg_index, 1);
        assert_eq!(found.fragment, "QUJDRA==");
    }

    #[test]
    fn test_find_through_submessages() {
        let log = "message index: 0: dispatch: submessages: encrypted: Zm9v: reply to contract failed";
        let found = find_encrypted_error(log).unwrap();
        assert_eq!(found.msg_index, 0);
        assert_eq!(found.fragment, "Zm9v");
    }

    #[test]
    fn test_plain_log_has_no_fragment() {
        assert!(find_encrypted_error("out of gas in location: ReadFlat").is_none());
    }

    #[test]
    fn test_leading_zero_index_is_ignored() {
        let log = "message index: 01: encrypted: Zm9v: execute contract failed";
        assert!(find_encrypted_error(log).is_none());
    }
}
